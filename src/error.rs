//! Error taxonomy for loading env files and talking to the secret store

use crate::domain::SecretId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single env-file line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineErrorKind {
    MissingSeparator,
    EmptyKey,
}

impl fmt::Display for LineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineErrorKind::MissingSeparator => write!(f, "expected KEY=VALUE"),
            LineErrorKind::EmptyKey => write!(f, "key is empty"),
        }
    }
}

/// A malformed line, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: LineErrorKind,
}

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error(".env file not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("error reading .env file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed .env file {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to fetch secret {id}: {message}")]
    Fetch { id: SecretId, message: String },

    #[error("failed to update secret {id}: {message}")]
    Update { id: SecretId, message: String },

    #[error("failed to create secret {id}: {message}")]
    Create { id: SecretId, message: String },

    #[error("could not encode payload for secret {id}: {reason}")]
    Encode { id: SecretId, reason: String },

    #[error("secret {id} does not hold a JSON object of string values: {reason}")]
    MalformedPayload { id: SecretId, reason: String },

    #[error("no secrets manager client configured for region {region}")]
    UnknownRegion { region: String },
}

/// Any failure of the full env-file-to-secret pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    EnvFile(#[from] EnvFileError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
