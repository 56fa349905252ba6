//! Core domain types shared by the parser, store and orchestrator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_REGION: &str = "us-east-2";
pub const DEFAULT_DESCRIPTION: &str = "Environment variables from .env file and existing secret";

/// Flat key/value mapping read from an env file or decoded from a secret.
///
/// A `BTreeMap` keeps serialized payloads and printed output in a stable
/// key order.
pub type EnvMap = BTreeMap<String, String>;

/// Region-scoped secret identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretId {
    pub name: String,
    pub region: String,
}

impl SecretId {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self { name: name.into(), region: region.into() }
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.name, self.region)
    }
}

/// Settings as loaded from defaults, config file, environment and CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub env_file: PathBuf,
    pub description: String,
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    pub aws: AwsSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            description: DEFAULT_DESCRIPTION.to_string(),
            source: SourceConfig::default(),
            destination: DestinationConfig::default(),
            aws: AwsSettings::default(),
        }
    }
}

/// Secret whose current value is merged under the local variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub region: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { name: None, region: DEFAULT_REGION.to_string() }
    }
}

/// Secret that receives the merged result. Unset fields fall back to the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Credential and endpoint settings for the AWS SDK.
///
/// With both fields unset the default credential chain is used
/// (environment, shared config files, instance metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    /// Named profile from `~/.aws/config`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Endpoint override, e.g. a LocalStack URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Fully resolved inputs for one push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub env_file: PathBuf,
    pub source: SecretId,
    pub destination: SecretId,
    /// Description attached to the destination secret when it has to be created.
    pub description: String,
}

/// Result of fetching a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Found(EnvMap),
    NotFound,
}

/// Result of overwriting an existing secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Which write path an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated,
    Created,
}

impl UpsertOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            UpsertOutcome::Updated => "updated",
            UpsertOutcome::Created => "created",
        }
    }
}

/// Progress of a push, reported as each stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent<'a> {
    SourceFound { id: &'a SecretId, keys: usize },
    SourceNotFound { id: &'a SecretId },
    DestinationWritten { id: &'a SecretId, outcome: UpsertOutcome },
}

/// Outcome of a completed push, used for status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub source_found: bool,
    pub outcome: UpsertOutcome,
    pub merged: EnvMap,
    /// Keys present on both sides whose remote value was replaced.
    pub overridden: usize,
    /// Keys present on both sides with the same value.
    pub unchanged: usize,
    /// Local keys that did not exist remotely.
    pub added: usize,
    /// Remote keys carried over untouched.
    pub preserved: usize,
}
