//! Command-line interface for secret-pusher
//!
//! Provides `push`, `check`, `init` and `completions` subcommands.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{StoreError, SyncError};

mod check;
mod init;
mod push;

/// Exit code for failures reported by the secret store.
pub const EXIT_STORE_FAILURE: u8 = 3;
/// Exit code for every other failure (env file, configuration, I/O).
pub const EXIT_FAILURE: u8 = 1;

/// Merge a local .env file into an AWS Secrets Manager secret
#[derive(Parser)]
#[command(name = "secret-pusher")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the env file over the source secret and write the destination secret
    Push(Box<push::PushArgs>),

    /// Parse the env file and list its keys without contacting the store
    Check(check::CheckArgs),

    /// Write a sample configuration file
    Init(init::InitArgs),

    /// Print shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(rust_log.as_deref(), cli.verbose);
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Push(args) => push::run(*args),
        Commands::Check(args) => check::run(args),
        Commands::Init(args) => init::run(args),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "secret-pusher",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// A non-empty, valid `RUST_LOG` wins outright. Otherwise `--verbose` selects
/// DEBUG and the default is WARN.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            let level = if verbose { Level::DEBUG } else { Level::WARN };
            EnvFilter::default().add_directive(level.into())
        })
}

/// Map a failed run to its process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let store_failure = err.chain().any(|cause| {
        cause.downcast_ref::<StoreError>().is_some()
            || matches!(cause.downcast_ref::<SyncError>(), Some(SyncError::Store(_)))
    });
    if store_failure {
        EXIT_STORE_FAILURE
    } else {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SecretId;
    use crate::error::EnvFileError;
    use anyhow::Context;
    use std::path::PathBuf;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{Layer, Registry};

    fn max_level(filter: &EnvFilter) -> Option<LevelFilter> {
        <EnvFilter as Layer<Registry>>::max_level_hint(filter)
    }

    #[test]
    fn test_rust_log_overrides_default_level() {
        assert_eq!(max_level(&log_filter(Some("debug"), false)), Some(LevelFilter::DEBUG));
        assert_eq!(max_level(&log_filter(Some("error"), true)), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_default_level_without_rust_log() {
        assert_eq!(max_level(&log_filter(None, false)), Some(LevelFilter::WARN));
        assert_eq!(max_level(&log_filter(None, true)), Some(LevelFilter::DEBUG));
        assert_eq!(max_level(&log_filter(Some("  "), false)), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_rust_log_enables_debug_events() {
        let subscriber = tracing_subscriber::registry().with(log_filter(Some("debug"), false));
        let enabled =
            tracing::subscriber::with_default(subscriber, || tracing::enabled!(Level::DEBUG));
        assert!(enabled);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_store_errors_map_to_store_exit_code() {
        let err = anyhow::Error::new(StoreError::Fetch {
            id: SecretId::new("app", "us-east-2"),
            message: "AccessDeniedException".into(),
        })
        .context("push failed");
        assert_eq!(exit_code(&err), EXIT_STORE_FAILURE);
    }

    #[test]
    fn test_env_file_errors_map_to_generic_exit_code() {
        let err: anyhow::Error =
            EnvFileError::NotFound { path: PathBuf::from(".env") }.into();
        assert_eq!(exit_code(&err), EXIT_FAILURE);
    }

    #[test]
    fn test_wrapped_sync_store_error_maps_to_store_exit_code() {
        let result: Result<(), SyncError> =
            Err(StoreError::UnknownRegion { region: "x".into() }.into());
        let err = result.context("run failed").expect_err("error");
        assert_eq!(exit_code(&err), EXIT_STORE_FAILURE);
    }
}
