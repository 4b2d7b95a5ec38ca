//! Error types for durafill
//!
//! Two tiers:
//! - [`EnrichError`] aborts the run and is returned to the caller.
//! - [`TaskError`] belongs to one entry; it is logged, counted and the run
//!   carries on with the remaining entries.

use std::path::PathBuf;
use thiserror::Error;

/// Run-aborting errors
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Input is not a JSON object of JSON objects
    #[error("Parse error: {0}")]
    Parse(String),

    /// Duration field name could not be determined
    #[error("Schema error: {0}")]
    Schema(String),

    /// Input could not be read or output could not be written
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration or profile resolution failed
    #[error(transparent)]
    Common(#[from] durafill_common::Error),
}

impl EnrichError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EnrichError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Per-entry errors
#[derive(Debug, Error)]
pub enum TaskError {
    /// Download failed: connection, timeout or non-2xx status
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Audio could not be decoded or has no usable duration
    #[error("Decode error: {0}")]
    Decode(String),

    /// Temporary file could not be created, written or read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Worker task panicked or the entry vanished from the collection
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for run-level operations
pub type Result<T> = std::result::Result<T, EnrichError>;
