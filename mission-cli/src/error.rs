//! Error types for the `mc` client.

use crate::config::ConfigError;
use mission_core::MissionError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Mission(#[from] MissionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid seed file {path}: {reason}")]
    SeedFile { path: String, reason: String },
    #[error("{failed} of {total} calendar entries failed to seed")]
    SeedFailed { failed: usize, total: usize },
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl From<mission_core::ValidationError> for CliError {
    fn from(err: mission_core::ValidationError) -> Self {
        CliError::Mission(err.into())
    }
}
