//! Init command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::domain::Config;

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "secret-pusher.toml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            args.output.display()
        );
    }

    let content = sample_config()?;
    fs::write(&args.output, content)
        .with_context(|| format!("Failed writing config file: {}", args.output.display()))?;
    println!("Sample configuration written to {}", args.output.display());
    Ok(())
}

fn sample_config() -> Result<String> {
    let mut config = Config::default();
    config.source.name = Some("my-app/config".to_string());
    let body = toml::to_string_pretty(&config).context("Failed to render sample config")?;
    Ok(format!(
        "# secret-pusher configuration\n\
         # Unset [destination] fields fall back to the [source] values.\n\n{}",
        body
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let text = sample_config().expect("render");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.source.name.as_deref(), Some("my-app/config"));
        assert_eq!(parsed.env_file, PathBuf::from(".env"));
    }
}
