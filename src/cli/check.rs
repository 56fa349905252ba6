//! Check command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::envfile::read_env_file;

#[derive(Args)]
pub struct CheckArgs {
    /// Path to config file (secret-pusher.toml or secret-pusher.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Env file to read (default: .env)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Print values as JSON instead of only listing keys
    #[arg(long)]
    pub show_values: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let config = load_config(&cwd, args.config.as_deref())?;
    let overrides = CliOverrides { env_file: args.env_file, ..Default::default() };
    let config = merge_cli_with_config(config, &overrides);

    let vars = read_env_file(&config.env_file)?;
    println!("Loaded {} variables from {}", vars.len(), config.env_file.display());

    if args.show_values {
        let json = serde_json::to_string_pretty(&vars).context("Failed to render variables")?;
        println!("{}", json);
    } else {
        for key in vars.keys() {
            println!("  {}", key);
        }
    }
    Ok(())
}
