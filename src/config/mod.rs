//! Configuration loading, merging and resolution
//!
//! Handles loading from config files, environment variables, and CLI arguments
//! with proper precedence (CLI > Env > File > Defaults).

use crate::domain::{Config, SecretId, SyncPlan};
use anyhow::Result;

pub mod loader;
pub mod merge;

pub use loader::{load_config, ENV_PREFIX};
pub use merge::{merge_cli_with_config, CliOverrides};

/// Validate `config` and turn it into the plan for one push.
///
/// The destination name and region default to the source's.
pub fn resolve_plan(config: &Config) -> Result<SyncPlan> {
    let source_name = non_empty(config.source.name.as_deref()).ok_or_else(|| {
        anyhow::anyhow!(
            "Source secret name is not set (use --source, [source] name in the config file, \
             or {}SOURCE__NAME)",
            ENV_PREFIX
        )
    })?;
    let source_region = non_empty(Some(config.source.region.as_str()))
        .ok_or_else(|| anyhow::anyhow!("Source region must not be empty"))?;

    let destination_name = non_empty(config.destination.name.as_deref()).unwrap_or(source_name);
    let destination_region =
        non_empty(config.destination.region.as_deref()).unwrap_or(source_region);

    if config.env_file.as_os_str().is_empty() {
        anyhow::bail!("Env file path must not be empty");
    }

    Ok(SyncPlan {
        env_file: config.env_file.clone(),
        source: SecretId::new(source_name, source_region),
        destination: SecretId::new(destination_name, destination_region),
        description: config.description.clone(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
