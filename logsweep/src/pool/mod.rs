/// Parallel batch execution and completion-order merging.
///
/// A batch owns a dedicated rayon pool of `worker_count` threads. Each thread
/// runs one long-lived worker loop against a shared `WorkQueue`:
///
/// ```text
/// Idle -> Claiming -> Scanning -> ReportingResult -> Idle ... -> Terminated
/// ```
///
/// Claiming is an atomic increment, so no path is handed out twice. Finished
/// outcomes go into a single crossbeam channel shared by all workers; the
/// `OutcomeStream` on the other end is the completion merger, and simply
/// receives until it has seen one outcome per path. Whatever finishes first is
/// yielded first:
///
/// ```rust,ignore
/// let pool = WorkerPool::new(&config)?;
/// for outcome in pool.run_batch(paths)? {
///     match outcome? {
///         FileOutcome::Matched { records, .. } => { /* alert */ }
///         FileOutcome::Failed { source, failure } => { /* report */ }
///     }
/// }
/// ```
///
/// # Backpressure
///
/// With a non-zero `result_capacity` the channel is bounded. A worker whose
/// result does not fit blocks in `send` and does not claim another path, so
/// at most `result_capacity + worker_count` outcomes exist at any time.
///
/// # Cancellation
///
/// Cancelling the `CancellationToken` (or dropping the stream) stops workers
/// from claiming further paths. Scans already running finish on their own
/// threads and their outcomes are discarded; the stream never yields a partial
/// outcome.
pub mod cancel;
pub mod engine;
mod queue;
pub mod stream;

pub use cancel::CancellationToken;
pub use engine::{run_batch, PathScanner, WorkerPool};
pub use stream::OutcomeStream;
