//! Manifest error types.

use std::path::PathBuf;

/// Error loading or validating a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file does not exist.
    #[error("The JSON manifest file {} was not found.", .0.display())]
    NotFound(PathBuf),
    /// Reading the manifest or a page source failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Manifest is not valid JSON.
    #[error("Invalid JSON in manifest: {0}")]
    Json(#[from] serde_json::Error),
    /// Manifest is valid JSON but describes pages incorrectly.
    #[error("{0}")]
    Invalid(String),
}

impl ManifestError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
