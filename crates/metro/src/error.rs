//! CLI error types.

use metro_config::ConfigError;
use metro_confluence::ConfluenceError;
use metro_manifest::ManifestError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Manifest(#[from] ManifestError),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0} page(s) could not be published")]
    PagesFailed(usize),
}
