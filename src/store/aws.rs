//! AWS Secrets Manager backend

use super::payload::{decode_payload, encode_payload};
use super::SecretStore;
use crate::domain::{AwsSettings, EnvMap, Fetched, SecretId, UpdateOutcome};
use crate::error::StoreError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use std::collections::BTreeMap;

/// Secrets Manager store holding one client per region.
pub struct AwsSecretStore {
    clients: BTreeMap<String, Client>,
}

impl AwsSecretStore {
    /// Build clients for every region in `regions` using `settings`.
    pub async fn connect<'a>(
        settings: &AwsSettings,
        regions: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut clients = BTreeMap::new();
        for region in regions {
            if clients.contains_key(region) {
                continue;
            }
            let mut loader =
                aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
            if let Some(profile) = &settings.profile {
                loader = loader.profile_name(profile);
            }
            if let Some(url) = &settings.endpoint_url {
                loader = loader.endpoint_url(url);
            }
            let sdk_config = loader.load().await;
            tracing::debug!("Configured Secrets Manager client for {}", region);
            clients.insert(region.to_string(), Client::new(&sdk_config));
        }
        Self { clients }
    }

    #[cfg(test)]
    fn from_clients(clients: BTreeMap<String, Client>) -> Self {
        Self { clients }
    }

    fn client(&self, id: &SecretId) -> Result<&Client, StoreError> {
        self.clients
            .get(&id.region)
            .ok_or_else(|| StoreError::UnknownRegion { region: id.region.clone() })
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn fetch(&self, id: &SecretId) -> Result<Fetched, StoreError> {
        let client = self.client(id)?;
        match client.get_secret_value().secret_id(&id.name).send().await {
            Ok(output) => {
                let Some(payload) = output.secret_string() else {
                    return Err(StoreError::MalformedPayload {
                        id: id.clone(),
                        reason: "secret has no string payload".to_string(),
                    });
                };
                decode_payload(id, payload).map(Fetched::Found)
            }
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_resource_not_found_exception()) {
                    Ok(Fetched::NotFound)
                } else {
                    Err(StoreError::Fetch {
                        id: id.clone(),
                        message: DisplayErrorContext(&err).to_string(),
                    })
                }
            }
        }
    }

    async fn update(&self, id: &SecretId, vars: &EnvMap) -> Result<UpdateOutcome, StoreError> {
        let client = self.client(id)?;
        let payload = encode_payload(id, vars)?;
        let result = client
            .update_secret()
            .secret_id(&id.name)
            .secret_string(payload)
            .send()
            .await;
        match result {
            Ok(_) => Ok(UpdateOutcome::Updated),
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_resource_not_found_exception()) {
                    Ok(UpdateOutcome::NotFound)
                } else {
                    Err(StoreError::Update {
                        id: id.clone(),
                        message: DisplayErrorContext(&err).to_string(),
                    })
                }
            }
        }
    }

    async fn create(
        &self,
        id: &SecretId,
        vars: &EnvMap,
        description: &str,
    ) -> Result<(), StoreError> {
        let client = self.client(id)?;
        let payload = encode_payload(id, vars)?;
        client
            .create_secret()
            .name(&id.name)
            .description(description)
            .secret_string(payload)
            .send()
            .await
            .map_err(|err| StoreError::Create {
                id: id.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }
}
