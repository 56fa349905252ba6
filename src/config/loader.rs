//! Config file discovery and layered loading

use crate::domain::Config;
use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides. Nested keys are split on `__`,
/// e.g. `SECRET_PUSHER_SOURCE__NAME`.
pub const ENV_PREFIX: &str = "SECRET_PUSHER_";

const CONFIG_CANDIDATES: [&str; 4] =
    ["secret-pusher.toml", ".secret-pusher.toml", "secret-pusher.yaml", "secret-pusher.yml"];

/// Load configuration with precedence Env > File > Defaults.
///
/// `config_path` must exist when given; otherwise the first candidate file in
/// `dir` is used, and no file at all simply means defaults.
pub fn load_config(dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let config_file = match config_path {
        Some(path) => {
            let path = dir.join(path);
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path)
        }
        None => discover_config(dir),
    };

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if let Some(file) = &config_file {
        tracing::debug!("Loading config from {}", file.display());
        let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        figment = match ext.as_str() {
            "toml" => figment.merge(Toml::file(file)),
            "yaml" | "yml" => figment.merge(Yaml::file(file)),
            other => anyhow::bail!(
                "Unsupported config extension '.{}' for file {}",
                other,
                file.display()
            ),
        };
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract::<Config>()
        .with_context(|| match &config_file {
            Some(file) => format!("Invalid configuration in {}", file.display()),
            None => "Invalid configuration".to_string(),
        })
}

fn discover_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES.iter().map(|candidate| dir.join(candidate)).find(|path| path.is_file())
}
