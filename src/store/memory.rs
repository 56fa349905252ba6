//! In-memory secret store with injectable failures

use super::payload::{decode_payload, encode_payload};
use super::SecretStore;
use crate::domain::{EnvMap, Fetched, SecretId, UpdateOutcome};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Store operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Update,
    Create,
}

/// Recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch(SecretId),
    Update(SecretId),
    Create(SecretId),
}

#[derive(Debug, Clone)]
enum Payload {
    Vars(EnvMap),
    Raw(String),
}

#[derive(Debug, Clone)]
struct StoredSecret {
    payload: Payload,
    description: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    secrets: HashMap<SecretId, StoredSecret>,
    failures: HashMap<Operation, String>,
    calls: Vec<Call>,
}

/// Secrets held in a map keyed by name and region.
///
/// Writes are stored as encoded JSON strings, the way the remote service keeps
/// them, so decoding failures surface exactly as they would remotely.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    state: Mutex<State>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing secret.
    pub fn with_secret(self, id: SecretId, vars: EnvMap) -> Self {
        self.lock()
            .secrets
            .insert(id, StoredSecret { payload: Payload::Vars(vars), description: None });
        self
    }

    /// Seed an existing secret with an arbitrary payload string.
    pub fn with_raw_payload(self, id: SecretId, payload: &str) -> Self {
        self.lock()
            .secrets
            .insert(id, StoredSecret { payload: Payload::Raw(payload.to_string()), description: None });
        self
    }

    /// Make every call to `op` fail with `message`.
    pub fn fail_on(self, op: Operation, message: &str) -> Self {
        self.lock().failures.insert(op, message.to_string());
        self
    }

    /// Decoded contents of a secret, if present and well-formed.
    pub fn get(&self, id: &SecretId) -> Option<EnvMap> {
        match self.lock().secrets.get(id)?.payload.clone() {
            Payload::Vars(vars) => Some(vars),
            Payload::Raw(raw) => decode_payload(id, &raw).ok(),
        }
    }

    /// Stored payload as a JSON string.
    pub fn payload(&self, id: &SecretId) -> Option<String> {
        match self.lock().secrets.get(id)?.payload.clone() {
            Payload::Vars(vars) => encode_payload(id, &vars).ok(),
            Payload::Raw(raw) => Some(raw),
        }
    }

    /// Description recorded when the secret was created.
    pub fn description(&self, id: &SecretId) -> Option<String> {
        self.lock().secrets.get(id).and_then(|s| s.description.clone())
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn fetch(&self, id: &SecretId) -> Result<Fetched, StoreError> {
        let payload = {
            let mut state = self.lock();
            state.calls.push(Call::Fetch(id.clone()));
            if let Some(message) = state.failures.get(&Operation::Fetch) {
                return Err(StoreError::Fetch { id: id.clone(), message: message.clone() });
            }
            match state.secrets.get(id) {
                Some(secret) => secret.payload.clone(),
                None => return Ok(Fetched::NotFound),
            }
        };
        match payload {
            Payload::Vars(vars) => Ok(Fetched::Found(vars)),
            Payload::Raw(raw) => decode_payload(id, &raw).map(Fetched::Found),
        }
    }

    async fn update(&self, id: &SecretId, vars: &EnvMap) -> Result<UpdateOutcome, StoreError> {
        let mut state = self.lock();
        state.calls.push(Call::Update(id.clone()));
        if let Some(message) = state.failures.get(&Operation::Update) {
            return Err(StoreError::Update { id: id.clone(), message: message.clone() });
        }
        match state.secrets.get_mut(id) {
            Some(secret) => {
                secret.payload = Payload::Raw(encode_payload(id, vars)?);
                Ok(UpdateOutcome::Updated)
            }
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    async fn create(
        &self,
        id: &SecretId,
        vars: &EnvMap,
        description: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(Call::Create(id.clone()));
        if let Some(message) = state.failures.get(&Operation::Create) {
            return Err(StoreError::Create { id: id.clone(), message: message.clone() });
        }
        if state.secrets.contains_key(id) {
            return Err(StoreError::Create {
                id: id.clone(),
                message: "ResourceExistsException: secret already exists".to_string(),
            });
        }
        let payload = Payload::Raw(encode_payload(id, vars)?);
        state.secrets.insert(
            id.clone(),
            StoredSecret {
                payload,
                description: Some(description.to_string()),
            },
        );
        Ok(())
    }
}
