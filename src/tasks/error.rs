//! Background task error types
//!
//! - **`AlreadyRunning`**: a slot was started while its previous run is still
//!   registered. This is a caller bug, never a retryable condition.
//! - **`NotRunning`**: completion was requested for a slot with no task.
//! - **`Worker`** / **`Panicked`**: the work itself failed; carried inside the
//!   completion event so the coordinator can still tidy up.

use super::TaskSlot;
use crate::workers::WorkerError;
use std::time::Duration;
use thiserror::Error;

/// Task lifecycle errors
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task is already registered under this slot
    #[error("A {0} task is already running")]
    AlreadyRunning(TaskSlot),

    /// No task is registered under this slot
    #[error("No {0} task is running")]
    NotRunning(TaskSlot),

    /// The worker thread could not be spawned
    #[error("Failed to spawn {slot} worker: {source}")]
    Spawn {
        slot: TaskSlot,
        #[source]
        source: std::io::Error,
    },

    /// The worker returned an error
    #[error("{slot} task failed: {source}")]
    Worker {
        slot: TaskSlot,
        #[source]
        source: WorkerError,
    },

    /// The worker panicked
    #[error("{slot} task panicked: {message}")]
    Panicked { slot: TaskSlot, message: String },

    /// Tasks were still running when a wait gave up
    #[error("Timed out after {elapsed:?} waiting for tasks: {slots:?}")]
    Timeout {
        elapsed: Duration,
        slots: Vec<TaskSlot>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_already_running_display() {
        let error = TaskError::AlreadyRunning(TaskSlot::Thumbnail);
        assert_eq!(error.to_string(), "A thumbnail task is already running");
    }

    #[test]
    fn test_worker_error_has_source() {
        let error = TaskError::Worker {
            slot: TaskSlot::Discovery,
            source: WorkerError::Cancelled,
        };
        assert!(error.source().is_some());
        assert!(error.to_string().starts_with("discovery task failed"));
    }

    #[test]
    fn test_panicked_has_no_source() {
        let error = TaskError::Panicked {
            slot: TaskSlot::Metadata,
            message: "boom".to_string(),
        };
        assert!(error.source().is_none());
        assert!(error.to_string().contains("boom"));
    }
}
