//! Apply command-line overrides on top of loaded configuration

use crate::domain::Config;
use std::path::PathBuf;

/// Values given on the command line. `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub env_file: Option<PathBuf>,
    pub source_name: Option<String>,
    pub source_region: Option<String>,
    pub destination_name: Option<String>,
    pub destination_region: Option<String>,
    pub description: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

pub fn merge_cli_with_config(mut config: Config, cli: &CliOverrides) -> Config {
    if let Some(env_file) = &cli.env_file {
        config.env_file = env_file.clone();
    }
    if let Some(name) = &cli.source_name {
        config.source.name = Some(name.clone());
    }
    if let Some(region) = &cli.source_region {
        config.source.region = region.clone();
    }
    if let Some(name) = &cli.destination_name {
        config.destination.name = Some(name.clone());
    }
    if let Some(region) = &cli.destination_region {
        config.destination.region = Some(region.clone());
    }
    if let Some(description) = &cli.description {
        config.description = description.clone();
    }
    if let Some(profile) = &cli.profile {
        config.aws.profile = Some(profile.clone());
    }
    if let Some(url) = &cli.endpoint_url {
        config.aws.endpoint_url = Some(url.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_keep_config() {
        let cfg = Config::default();
        assert_eq!(merge_cli_with_config(cfg.clone(), &CliOverrides::default()), cfg);
    }

    #[test]
    fn test_overrides_replace_loaded_values() {
        let mut cfg = Config::default();
        cfg.source.name = Some("file-name".into());
        cfg.aws.profile = Some("file-profile".into());

        let overrides = CliOverrides {
            env_file: Some(PathBuf::from("prod.env")),
            source_name: Some("cli-name".into()),
            destination_region: Some("ap-southeast-2".into()),
            ..Default::default()
        };
        let merged = merge_cli_with_config(cfg, &overrides);

        assert_eq!(merged.env_file, PathBuf::from("prod.env"));
        assert_eq!(merged.source.name.as_deref(), Some("cli-name"));
        assert_eq!(merged.destination.region.as_deref(), Some("ap-southeast-2"));
        assert_eq!(merged.aws.profile.as_deref(), Some("file-profile"));
    }
}
