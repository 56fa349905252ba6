//! Secret store adapters (AWS Secrets Manager, in-memory)

use crate::domain::{EnvMap, Fetched, SecretId, UpdateOutcome, UpsertOutcome};
use crate::error::StoreError;
use async_trait::async_trait;

pub mod aws;
pub mod memory;
pub mod payload;

pub use aws::AwsSecretStore;
pub use memory::InMemorySecretStore;
pub use payload::{decode_payload, encode_payload};

/// Region-scoped store of JSON-object secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch and decode a secret. Absence is `Fetched::NotFound`, not an error.
    async fn fetch(&self, id: &SecretId) -> Result<Fetched, StoreError>;

    /// Replace the payload of an existing secret.
    async fn update(&self, id: &SecretId, vars: &EnvMap) -> Result<UpdateOutcome, StoreError>;

    /// Create a new secret holding `vars`.
    async fn create(&self, id: &SecretId, vars: &EnvMap, description: &str)
        -> Result<(), StoreError>;

    /// Update the secret, creating it when the update reports it missing.
    async fn upsert(
        &self,
        id: &SecretId,
        vars: &EnvMap,
        description: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        match self.update(id, vars).await? {
            UpdateOutcome::Updated => Ok(UpsertOutcome::Updated),
            UpdateOutcome::NotFound => {
                tracing::debug!("Secret {} missing on update, creating it", id);
                self.create(id, vars, description).await?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
