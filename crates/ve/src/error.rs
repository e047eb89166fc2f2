//! CLI error types.

use ve_config::ConfigError;
use ve_page::RenderError;
use ve_source::SourceError;
use ve_storage::StorageError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),
}
