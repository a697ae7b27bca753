//! Error types for Epicycle operations.

use std::io;

use thiserror::Error;

/// The main error type for Epicycle operations.
#[derive(Debug, Error)]
pub enum EpicycleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl From<serde_json::Error> for EpicycleError {
    fn from(error: serde_json::Error) -> Self {
        Self::Load(error.to_string())
    }
}
