//! Error types for exporting captured data

use std::io;
use thiserror::Error;

/// Failure writing a replay script or session report
#[derive(Debug, Error)]
pub enum ExportError {
    /// I/O error creating or writing the output file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to serialize the report
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
