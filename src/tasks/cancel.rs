//! Stop flag shared between the registry and one worker run

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag handed to each worker run
///
/// The registry raises it on shutdown. Workers look at it through
/// [`TaskContext::check_cancelled`](super::TaskContext::check_cancelled)
/// between units of work, so a worker blocked elsewhere keeps running until
/// its next check.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Raise the flag for this token and every clone of it
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}
