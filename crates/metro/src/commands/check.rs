//! `metro check` command implementation.

use std::path::PathBuf;

use clap::Args;
use metro_manifest::Manifest;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to the JSON manifest.
    manifest: PathBuf,
}

impl CheckArgs {
    /// Load the manifest, rendering every page, and print the plan.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let manifest = Manifest::load(&self.manifest)?;
        if manifest.is_empty() {
            output.warning("Manifest describes no pages.");
            return Ok(());
        }

        output.info(&manifest.to_string());
        output.success(&format!(
            "Manifest OK: {} to create, {} to update, {} to delete",
            manifest.to_create.len(),
            manifest.to_update.len(),
            manifest.to_delete.len()
        ));
        Ok(())
    }
}
