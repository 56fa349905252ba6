//! Push command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use crate::config::{load_config, merge_cli_with_config, resolve_plan, CliOverrides};
use crate::domain::{EnvMap, SyncEvent, SyncPlan, SyncReport, UpsertOutcome};
use crate::envfile::read_env_file;
use crate::store::{AwsSecretStore, SecretStore};
use crate::sync::push_with_events;

#[derive(Args)]
pub struct PushArgs {
    /// Path to config file (secret-pusher.toml or secret-pusher.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Env file to read (default: .env)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Name of the secret to merge over
    #[arg(short = 's', long = "source", value_name = "NAME")]
    pub source: Option<String>,

    /// Region of the source secret (default: us-east-2)
    #[arg(long, value_name = "REGION")]
    pub source_region: Option<String>,

    /// Name of the secret to write (default: the source name)
    #[arg(short = 'd', long = "destination", value_name = "NAME")]
    pub destination: Option<String>,

    /// Region of the destination secret (default: the source region)
    #[arg(long, value_name = "REGION")]
    pub destination_region: Option<String>,

    /// Description set when the destination secret is created
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// AWS profile used for credentials
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Override the Secrets Manager endpoint (e.g. LocalStack)
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,
}

impl PushArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            env_file: self.env_file.clone(),
            source_name: self.source.clone(),
            source_region: self.source_region.clone(),
            destination_name: self.destination.clone(),
            destination_region: self.destination_region.clone(),
            description: self.description.clone(),
            profile: self.profile.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }
}

pub fn run(args: PushArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let config = load_config(&cwd, args.config.as_deref())?;
    let config = merge_cli_with_config(config, &args.overrides());
    let plan = resolve_plan(&config)?;

    println!("Looking for .env file at: {}", plan.env_file.display());
    let local = read_env_file(&plan.env_file)?;
    println!("Loaded {} variables from {}", local.len(), plan.env_file.display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        let regions = [plan.source.region.as_str(), plan.destination.region.as_str()];
        let store = AwsSecretStore::connect(&config.aws, regions).await;
        push_reporting(&store, &local, &plan, &mut std::io::stdout()).await
    })?;
    Ok(())
}

/// Push `local` and write a status line to `out` as each stage completes,
/// followed by a summary once the destination is written.
async fn push_reporting<S, W>(
    store: &S,
    local: &EnvMap,
    plan: &SyncPlan,
    out: &mut W,
) -> Result<SyncReport>
where
    S: SecretStore + ?Sized,
    W: Write,
{
    let mut write_error = None;
    let result = push_with_events(store, local, plan, |event| {
        if write_error.is_none() {
            write_error = writeln!(out, "{}", event_line(&event)).err();
        }
    })
    .await;
    if let Some(err) = write_error {
        return Err(err).context("Failed to write status output");
    }

    let report = result?;
    for line in summary_lines(plan, &report) {
        writeln!(out, "{}", line).context("Failed to write status output")?;
    }
    Ok(report)
}

fn event_line(event: &SyncEvent<'_>) -> String {
    match event {
        SyncEvent::SourceFound { id, .. } => format!("Source secret {} found and loaded.", id),
        SyncEvent::SourceNotFound { id } => {
            format!("Source secret {} not found. Using only local variables.", id)
        }
        SyncEvent::DestinationWritten { id, outcome: UpsertOutcome::Updated } => {
            format!("Secret {} updated successfully.", id)
        }
        SyncEvent::DestinationWritten { id, outcome: UpsertOutcome::Created } => {
            format!("Secret {} created successfully.", id)
        }
    }
}

/// Closing lines for a finished push.
fn summary_lines(plan: &SyncPlan, report: &SyncReport) -> [String; 2] {
    let verb = if report.source_found { "merged and copied" } else { "copied" };
    [
        format!(
            "Keys: {} total ({} overridden, {} unchanged, {} added, {} preserved)",
            report.merged.len(),
            report.overridden,
            report.unchanged,
            report.added,
            report.preserved
        ),
        format!("Secret {} to {} successfully.", verb, plan.destination),
    ]
}
