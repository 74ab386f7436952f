use crossbeam_channel::{Receiver, RecvError};
use std::path::PathBuf;
use tracing::{debug, info};

use super::cancel::StopSignal;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::FileOutcome;

/// What a worker hands back for one claimed path
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    Outcome(FileOutcome),
    Panicked { path: PathBuf, message: String },
}

/// Outcomes of a batch, in the order the files finished.
///
/// The stream ends after one item per submitted path. Dropping it early
/// stops the workers from claiming further paths and tears the pool down.
pub struct OutcomeStream {
    receiver: Option<Receiver<WorkerMessage>>,
    pool: Option<rayon::ThreadPool>,
    signal: StopSignal,
    metrics: ScanMetrics,
    expected: usize,
    received: usize,
}

impl OutcomeStream {
    pub(crate) fn new(
        receiver: Option<Receiver<WorkerMessage>>,
        pool: Option<rayon::ThreadPool>,
        signal: StopSignal,
        metrics: ScanMetrics,
        expected: usize,
    ) -> Self {
        Self {
            receiver,
            pool,
            signal,
            metrics,
            expected,
            received: 0,
        }
    }

    /// Number of outcomes the batch will produce if not cancelled
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Counters for this batch only. Clone it to read the totals after the
    /// stream has been consumed.
    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Requests cancellation; the next call to `next` returns `None`
    pub fn cancel(&self) {
        self.signal.caller().cancel();
    }

    fn finish(&mut self) {
        let Some(receiver) = self.receiver.take() else {
            return;
        };
        self.signal.consumer_dropped();
        drop(receiver);
        // Workers still inside a scan finish it on their own threads
        self.pool.take();

        self.metrics.log_stats();
        info!(
            "Batch finished: {} of {} outcomes delivered",
            self.received, self.expected
        );
    }
}

impl Iterator for OutcomeStream {
    type Item = ScanResult<FileOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.received >= self.expected || self.signal.is_cancelled_by_caller() {
            self.finish();
            return None;
        }

        let message = self.receiver.as_ref()?.recv();

        // An outcome that lands after cancellation belongs to an abandoned scan
        if self.signal.is_cancelled_by_caller() {
            debug!("Batch cancelled after {} outcomes", self.received);
            self.finish();
            return None;
        }

        let item = match message {
            Ok(WorkerMessage::Outcome(outcome)) => Ok(outcome),
            Ok(WorkerMessage::Panicked { path, message }) => {
                Err(ScanError::worker_panicked(path, message))
            }
            Err(RecvError) => {
                let err = ScanError::BatchDisconnected {
                    expected: self.expected,
                    received: self.received,
                };
                self.received = self.expected;
                self.finish();
                return Some(Err(err));
            }
        };

        self.received += 1;
        if self.received == self.expected {
            self.finish();
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.receiver.is_none() {
            return (0, Some(0));
        }
        (0, Some(self.expected - self.received))
    }
}

impl Drop for OutcomeStream {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for OutcomeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeStream")
            .field("expected", &self.expected)
            .field("received", &self.received)
            .field("open", &self.receiver.is_some())
            .finish()
    }
}
