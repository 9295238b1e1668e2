//! Mutually exclusive background tasks
//!
//! Each [`TaskSlot`] names one kind of background operation. At most one task
//! per slot runs at a time; the [`TaskRegistry`] enforces that, locks the
//! relevant view controls while the task runs and funnels completions back to
//! the coordinating thread as [`TaskEvent`]s.
//!
//! Workers run on their own threads and only see a snapshot of the data they
//! need plus a [`TaskContext`]. They never touch the gallery list or the view.

mod cancel;
pub mod error;
mod registry;

pub use cancel::CancellationToken;
pub use error::TaskError;
pub use registry::{ShutdownReport, TaskRegistry};

use crate::gallery::{Gallery, GalleryId, MetadataUpdate, ThumbnailHandle};
use crate::view::{Control, ControlSet};
use crate::workers::WorkerError;
use std::fmt;
use std::sync::mpsc::Sender;

/// Kind of background operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskSlot {
    /// Initial catalog discovery
    Discovery,
    /// Thumbnail generation for a batch of galleries
    Thumbnail,
    /// Remote metadata refresh
    Metadata,
}

impl TaskSlot {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Thumbnail => "thumbnail",
            Self::Metadata => "metadata",
        }
    }

    /// Controls locked while a task of this kind runs
    #[must_use]
    pub fn locked_controls(self) -> ControlSet {
        match self {
            Self::Discovery | Self::Thumbnail => ControlSet::All,
            Self::Metadata => {
                ControlSet::only(&[Control::Refresh, Control::Submit, Control::Cancel])
            }
        }
    }
}

impl fmt::Display for TaskSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result payload of a finished task
#[derive(Debug)]
pub enum TaskOutput {
    Discovered(Vec<Gallery>),
    Thumbnails(Vec<(GalleryId, ThumbnailHandle)>),
    Metadata(Vec<MetadataUpdate>),
}

/// Message from a worker to the coordinator
///
/// `run` identifies the start that produced the event, so output from a
/// worker detached at shutdown can be told apart from a later task in the
/// same slot.
#[derive(Debug)]
pub enum TaskEvent {
    Progress {
        slot: TaskSlot,
        run: u64,
        percent: u8,
    },
    Finished {
        slot: TaskSlot,
        run: u64,
        result: Result<TaskOutput, TaskError>,
    },
}

impl TaskEvent {
    /// Slot and run id of the task that sent this event
    #[must_use]
    pub const fn origin(&self) -> (TaskSlot, u64) {
        match self {
            Self::Progress { slot, run, .. } | Self::Finished { slot, run, .. } => (*slot, *run),
        }
    }
}

/// Handle given to a running worker
///
/// Carries the cancellation token and the channel back to the coordinator.
#[derive(Debug, Clone)]
pub struct TaskContext {
    slot: TaskSlot,
    run: u64,
    cancel: CancellationToken,
    events: Sender<TaskEvent>,
}

impl TaskContext {
    pub(crate) const fn new(
        slot: TaskSlot,
        cancel: CancellationToken,
        events: Sender<TaskEvent>,
    ) -> Self {
        Self {
            slot,
            run: 0,
            cancel,
            events,
        }
    }

    pub(crate) const fn with_run(mut self, run: u64) -> Self {
        self.run = run;
        self
    }

    #[must_use]
    pub const fn slot(&self) -> TaskSlot {
        self.slot
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Checkpoint for workers: bail out if shutdown was requested
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Cancelled` once the task has been cancelled.
    pub fn check_cancelled(&self) -> Result<(), WorkerError> {
        if self.is_cancelled() {
            Err(WorkerError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Report `done` out of `total` units of work
    pub fn report_progress(&self, done: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (done.min(total) * 100 / total) as u8
        };
        // The coordinator may already be gone during shutdown
        let _ = self.events.send(TaskEvent::Progress {
            slot: self.slot,
            run: self.run,
            percent,
        });
    }

    pub(crate) fn finish(&self, result: Result<TaskOutput, TaskError>) {
        let _ = self.events.send(TaskEvent::Finished {
            slot: self.slot,
            run: self.run,
            result,
        });
    }
}
