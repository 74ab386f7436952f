use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Token for cooperative cancellation of a scan batch.
///
/// Uses an AtomicBool internally. Clone is cheap and shares state. Workers
/// check it before claiming each path; scans already running are allowed to
/// finish and their outcomes are discarded.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token (not cancelled).
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Stop conditions seen by a worker: the caller's token, or the outcome
/// stream having been dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct StopSignal {
    caller: CancellationToken,
    dropped: CancellationToken,
}

impl StopSignal {
    pub(crate) fn new(caller: CancellationToken) -> Self {
        Self {
            caller,
            dropped: CancellationToken::new(),
        }
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.caller.is_cancelled() || self.dropped.is_cancelled()
    }

    pub(crate) fn is_cancelled_by_caller(&self) -> bool {
        self.caller.is_cancelled()
    }

    pub(crate) fn caller(&self) -> &CancellationToken {
        &self.caller
    }

    /// Marks the consumer as gone without touching the caller's token
    pub(crate) fn consumer_dropped(&self) {
        self.dropped.cancel();
    }
}
