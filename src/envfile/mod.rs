//! Env file loading

use crate::domain::EnvMap;
use crate::error::EnvFileError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub mod parser;

pub use parser::parse_env_str;

/// Read and parse the env file at `path`.
pub fn read_env_file(path: &Path) -> Result<EnvMap, EnvFileError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => EnvFileError::NotFound { path: path.to_path_buf() },
        _ => EnvFileError::Read { path: path.to_path_buf(), source },
    })?;

    let vars = parse_env_str(&content)
        .map_err(|source| EnvFileError::Malformed { path: path.to_path_buf(), source })?;

    tracing::debug!("Parsed {} variables from {}", vars.len(), path.display());
    Ok(vars)
}
