// src/domains/export/types.rs

use serde::Serialize;
use thiserror::Error;

/// Errors raised while producing an export artifact. Missing optional data
/// (empty stages, absent evidence, unresolved municipalities) is never an
/// error; only structural failures of the artifact itself surface here.
#[derive(Debug, Error, Clone, Serialize)]
pub enum ExportError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Evidence payload could not be decoded for layout
    #[error("Image error: {0}")]
    Image(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
