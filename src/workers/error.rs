//! Worker error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by background workers
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The task was cancelled before it finished
    #[error("Task was cancelled")]
    Cancelled,

    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A gallery manifest could not be parsed
    #[error("Invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Any other worker-specific failure
    #[error("{0}")]
    Failed(String),
}
