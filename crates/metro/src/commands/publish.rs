//! `metro publish` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use metro_config::{CliSettings, Config};
use metro_confluence::{ConfluenceClient, Outcome, PublishOptions, PublishReport, Publisher};
use metro_manifest::Manifest;
use tracing::debug;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Path to the JSON manifest.
    manifest: PathBuf,

    /// Confluence base URL (overrides config).
    #[arg(long)]
    base_url: Option<String>,

    /// Confluence username (overrides config).
    #[arg(short, long)]
    username: Option<String>,

    /// Confluence password (overrides config).
    #[arg(long, env = "METRO_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Parent page for created pages that name none (overrides config).
    #[arg(long)]
    parent_id: Option<u64>,

    /// Show what would change without writing to Confluence.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover metro.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the manifest is invalid, the
    /// server rejects the credentials, or any page fails to publish.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            base_url: self.base_url,
            username: self.username,
            password: self.password,
            parent_id: self.parent_id,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            debug!("Using config {}", path.display());
        }
        let conf = config.require_confluence()?;

        let manifest = Manifest::load(&self.manifest)?;
        if manifest.is_empty() {
            output.warning("Manifest describes no pages.");
            return Ok(());
        }

        let client = ConfluenceClient::new(
            &conf.base_url,
            &conf.username,
            &conf.password,
            Duration::from_secs(conf.timeout_secs),
        );
        let version = client.server_version()?;
        output.info(&format!(
            "Connected to {} (v{})",
            client.base_url(),
            version.as_deref().unwrap_or("unknown")
        ));

        let options = PublishOptions {
            default_parent_id: config.publish.default_parent_id,
            dry_run: self.dry_run,
        };
        let report = Publisher::new(&client, options).publish(&manifest);

        if self.dry_run {
            output.highlight("\n[DRY RUN] No changes made.");
        }
        print_report(output, &report);

        match report.failures().count() {
            0 => Ok(()),
            failed => Err(CliError::PagesFailed(failed)),
        }
    }
}

fn print_report(output: &Output, report: &PublishReport) {
    for outcome in &report.outcomes {
        let line = outcome.to_string();
        match outcome {
            Outcome::Created { .. } | Outcome::Updated { .. } | Outcome::Deleted { .. } => {
                output.success(&line);
            }
            Outcome::Skipped { .. } => output.warning(&line),
            Outcome::Failed { .. } => output.error(&line),
            Outcome::Unchanged { .. } | Outcome::Planned { .. } => output.info(&line),
        }
    }
}
