use super::cancel::CancellationToken;
use super::error::TaskError;
use super::{TaskContext, TaskEvent, TaskOutput, TaskSlot};
use crate::view::{ControlSet, GalleryView};
use crate::workers::WorkerError;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct RunningTask {
    run: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    controls: ControlSet,
    started: Instant,
}

/// Outcome of [`TaskRegistry::shutdown`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that acknowledged cancellation within the grace period
    pub stopped: Vec<TaskSlot>,
    /// Tasks still running when the grace period ran out; their threads are detached
    pub abandoned: Vec<TaskSlot>,
}

/// Registry of running background tasks, one per slot
///
/// Owned by the coordinator. Workers report back through an internal channel
/// that the coordinator drains with [`try_next_event`](Self::try_next_event)
/// or [`next_event`](Self::next_event), so completion handling is always
/// serialized on the coordinating thread.
#[derive(Debug)]
pub struct TaskRegistry {
    running: HashMap<TaskSlot, RunningTask>,
    next_run: u64,
    events_tx: Sender<TaskEvent>,
    events_rx: Receiver<TaskEvent>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry {
    #[must_use]
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            running: HashMap::new(),
            next_run: 0,
            events_tx,
            events_rx,
        }
    }

    /// Register and launch `work` under `slot`
    ///
    /// Locks the slot's controls on `view` before the worker thread starts.
    /// The worker's result, or its panic, arrives later as
    /// [`TaskEvent::Finished`].
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyRunning` if `slot` is occupied, or
    /// `TaskError::Spawn` if the thread could not be created.
    pub fn start<F>(
        &mut self,
        slot: TaskSlot,
        view: &mut dyn GalleryView,
        work: F,
    ) -> Result<(), TaskError>
    where
        F: FnOnce(&TaskContext) -> Result<TaskOutput, WorkerError> + Send + 'static,
    {
        if self.running.contains_key(&slot) {
            return Err(TaskError::AlreadyRunning(slot));
        }

        let controls = slot.locked_controls();
        view.disable_controls(&controls);

        self.next_run += 1;
        let run = self.next_run;
        let cancel = CancellationToken::new();
        let ctx = TaskContext::new(slot, cancel.clone(), self.events_tx.clone()).with_run(run);

        let spawned = thread::Builder::new()
            .name(format!("sadpanda-{slot}"))
            .spawn(move || {
                let result = match panic::catch_unwind(AssertUnwindSafe(|| work(&ctx))) {
                    Ok(Ok(output)) => Ok(output),
                    Ok(Err(source)) => Err(TaskError::Worker { slot, source }),
                    Err(payload) => Err(TaskError::Panicked {
                        slot,
                        message: panic_message(payload.as_ref()),
                    }),
                };
                ctx.finish(result);
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(source) => {
                if let Some(unlocked) = controls.without(&self.locked_controls()) {
                    view.enable_controls(&unlocked);
                }
                return Err(TaskError::Spawn { slot, source });
            }
        };

        info!(%slot, run, "task started");
        self.running.insert(
            slot,
            RunningTask {
                run,
                cancel,
                handle,
                controls,
                started: Instant::now(),
            },
        );
        Ok(())
    }

    /// Unregister a finished task and release its controls
    ///
    /// Controls still locked by another running slot stay disabled. Returns
    /// how long the task ran.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotRunning` if nothing is registered under `slot`.
    pub fn complete(
        &mut self,
        slot: TaskSlot,
        view: &mut dyn GalleryView,
    ) -> Result<Duration, TaskError> {
        let task = self
            .running
            .remove(&slot)
            .ok_or(TaskError::NotRunning(slot))?;

        let elapsed = task.started.elapsed();
        if task.handle.join().is_err() {
            warn!(%slot, "worker thread panicked after reporting completion");
        }

        if let Some(unlocked) = task.controls.without(&self.locked_controls()) {
            view.enable_controls(&unlocked);
        }
        view.clear_progress();

        info!(%slot, ?elapsed, "task done");
        Ok(elapsed)
    }

    /// Next pending event, without blocking
    pub fn try_next_event(&self) -> Option<TaskEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Next pending event, waiting up to `timeout`
    pub fn next_event(&self, timeout: Duration) -> Option<TaskEvent> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Whether `event` came from the task currently registered in its slot
    ///
    /// Events from workers detached by [`shutdown`](Self::shutdown) keep
    /// arriving after the slot is reused and must not complete the new task.
    #[must_use]
    pub fn is_current(&self, event: &TaskEvent) -> bool {
        let (slot, run) = event.origin();
        self.running.get(&slot).is_some_and(|task| task.run == run)
    }

    #[must_use]
    pub fn is_running(&self, slot: TaskSlot) -> bool {
        self.running.contains_key(&slot)
    }

    #[must_use]
    pub fn has_running(&self) -> bool {
        !self.running.is_empty()
    }

    /// Registered slots, in slot order
    #[must_use]
    pub fn running_slots(&self) -> Vec<TaskSlot> {
        let mut slots: Vec<TaskSlot> = self.running.keys().copied().collect();
        slots.sort_unstable();
        slots
    }

    /// Union of the controls locked by every registered task
    fn locked_controls(&self) -> ControlSet {
        self.running
            .values()
            .fold(ControlSet::Only(Vec::new()), |acc, task| {
                acc.union(&task.controls)
            })
    }

    /// Cancel every task and wait up to `grace` for the workers to exit
    ///
    /// Workers that do not reach a cancellation checkpoint in time are
    /// detached and reported as abandoned. Pending events are discarded.
    pub fn shutdown(&mut self, grace: Duration) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        if self.running.is_empty() {
            return report;
        }

        for (slot, task) in &self.running {
            debug!(%slot, "cancelling task");
            task.cancel.cancel();
        }

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline
            && self.running.values().any(|t| !t.handle.is_finished())
        {
            thread::sleep(SHUTDOWN_POLL_INTERVAL);
        }

        let mut tasks: Vec<(TaskSlot, RunningTask)> = self.running.drain().collect();
        tasks.sort_unstable_by_key(|(slot, _)| *slot);
        for (slot, task) in tasks {
            if task.handle.is_finished() {
                let _ = task.handle.join();
                report.stopped.push(slot);
            } else {
                warn!(%slot, "worker did not stop in time, detaching");
                report.abandoned.push(slot);
            }
        }

        while self.events_rx.try_recv().is_ok() {}
        report
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        for task in self.running.values() {
            task.cancel.cancel();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
