use crossbeam_channel::{bounded, unbounded, Sender};
use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};

use super::cancel::{CancellationToken, StopSignal};
use super::queue::WorkQueue;
use super::stream::{OutcomeStream, WorkerMessage};
use crate::config::{ScanConfig, DEFAULT_RESULT_CAPACITY};
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::FileOutcome;
use crate::scan::LineScanner;

/// The per-file step run by each worker.
///
/// Implementations must not fail: every error is reported through the
/// returned outcome. `metrics` belongs to the current batch.
pub trait PathScanner: Send + Sync + 'static {
    fn scan(&self, path: &Path, metrics: &ScanMetrics) -> FileOutcome;
}

impl PathScanner for LineScanner {
    fn scan(&self, path: &Path, metrics: &ScanMetrics) -> FileOutcome {
        self.scan_with_metrics(path, metrics)
    }
}

/// Fixed-size set of workers scanning a batch of paths
#[derive(Debug)]
pub struct WorkerPool<S = LineScanner> {
    scanner: Arc<S>,
    worker_count: NonZeroUsize,
    result_capacity: usize,
}

impl WorkerPool<LineScanner> {
    /// Creates a pool from configuration
    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        let scanner = LineScanner::from_config(config)?;
        Ok(Self::with_scanner(scanner, config.worker_count)
            .with_result_capacity(config.result_capacity))
    }
}

impl<S: PathScanner> WorkerPool<S> {
    /// Creates a pool around an existing scanner
    pub fn with_scanner(scanner: S, worker_count: NonZeroUsize) -> Self {
        Self {
            scanner: Arc::new(scanner),
            worker_count,
            result_capacity: DEFAULT_RESULT_CAPACITY,
        }
    }

    /// Bounds the number of finished outcomes waiting for the consumer.
    /// Zero removes the bound.
    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    pub fn worker_count(&self) -> NonZeroUsize {
        self.worker_count
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    /// Scans `paths` and returns their outcomes in completion order
    pub fn run_batch<I, P>(&self, paths: I) -> ScanResult<OutcomeStream>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.run_batch_with_cancel(paths, CancellationToken::new())
    }

    /// Like [`run_batch`](Self::run_batch), stopping early once `token` is cancelled
    pub fn run_batch_with_cancel<I, P>(
        &self,
        paths: I,
        token: CancellationToken,
    ) -> ScanResult<OutcomeStream>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let queue = Arc::new(WorkQueue::new(
            paths.into_iter().map(Into::into).collect(),
        ));
        let expected = queue.len();
        let signal = StopSignal::new(token);
        let metrics = ScanMetrics::new();

        if expected == 0 {
            debug!("No paths provided, returning empty stream");
            return Ok(OutcomeStream::new(None, None, signal, metrics, 0));
        }

        // Workers beyond the number of paths would never claim anything
        let workers = self.worker_count.get().min(expected);
        info!(
            "Starting batch of {} files with {} workers",
            expected, workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("logsweep-worker-{}", i))
            .build()
            .map_err(|e| ScanError::PoolBuild(e.to_string()))?;

        let (sender, receiver) = if self.result_capacity == 0 {
            unbounded()
        } else {
            bounded(self.result_capacity)
        };

        for id in 0..workers {
            let queue = Arc::clone(&queue);
            let scanner = Arc::clone(&self.scanner);
            let sender = sender.clone();
            let signal = signal.clone();
            let metrics = metrics.clone();
            pool.spawn(move || {
                run_worker(id, &queue, scanner.as_ref(), &metrics, &sender, &signal)
            });
        }
        drop(sender);

        Ok(OutcomeStream::new(
            Some(receiver),
            Some(pool),
            signal,
            metrics,
            expected,
        ))
    }
}

/// Scans `paths` with the default `ERROR` scanner on `worker_count` workers.
/// A worker count of zero is treated as one.
pub fn run_batch<I, P>(paths: I, worker_count: usize) -> ScanResult<OutcomeStream>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let worker_count = NonZeroUsize::new(worker_count).unwrap_or(NonZeroUsize::MIN);
    WorkerPool::with_scanner(LineScanner::default(), worker_count).run_batch(paths)
}

// Idle -> Claiming -> Scanning -> ReportingResult -> Idle, until the queue
// drains or the batch is stopped.
fn run_worker<S: PathScanner>(
    id: usize,
    queue: &WorkQueue,
    scanner: &S,
    metrics: &ScanMetrics,
    sender: &Sender<WorkerMessage>,
    signal: &StopSignal,
) {
    debug!("Worker {} started", id);

    while !signal.is_stopped() {
        let Some(path) = queue.claim() else {
            break;
        };
        trace!("Worker {} claimed {}", id, path.display());

        let message = match panic::catch_unwind(AssertUnwindSafe(|| scanner.scan(path, metrics))) {
            Ok(outcome) => WorkerMessage::Outcome(outcome),
            Err(payload) => WorkerMessage::Panicked {
                path: path.to_path_buf(),
                message: panic_message(payload.as_ref()),
            },
        };

        // Blocks while the result buffer is full
        if sender.send(message).is_err() {
            debug!("Worker {} lost its consumer", id);
            break;
        }
    }

    debug!(
        "Worker {} terminated, {} paths unclaimed",
        id,
        queue.remaining()
    );
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
