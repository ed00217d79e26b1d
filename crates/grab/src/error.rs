//! CLI error types.

use grab_config::ConfigError;
use grab_core::GrabberError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid site fixture: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("{0}")]
    Grabber(#[from] GrabberError),

    #[error("{0}")]
    Validation(String),
}
