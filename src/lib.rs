//! secret-pusher: merge a local `.env` file into an AWS Secrets Manager secret
//!
//! The pipeline reads `KEY=VALUE` lines, fetches the source secret if it
//! exists, overlays the local values on it and writes the result to the
//! destination secret, creating it when missing.

pub mod cli;
pub mod config;
pub mod domain;
pub mod envfile;
pub mod error;
pub mod store;
pub mod sync;

pub use domain::{EnvMap, SecretId, SyncEvent, SyncPlan, SyncReport};
pub use error::{EnvFileError, StoreError, SyncError};
