//! Error types for pool export.

use thiserror::Error;

/// Errors that can occur while exporting records.
#[derive(Error, Debug)]
pub enum PoolError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
