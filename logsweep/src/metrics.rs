use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters shared by every worker of a batch.
///
/// Clones share the same underlying counters.
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    files_scanned: Arc<AtomicU64>,
    files_failed: Arc<AtomicU64>,
    lines_read: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    records_matched: Arc<AtomicU64>,
    longest_line: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            files_scanned: Arc::new(AtomicU64::new(0)),
            files_failed: Arc::new(AtomicU64::new(0)),
            lines_read: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            records_matched: Arc::new(AtomicU64::new(0)),
            longest_line: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a file that was read to the end
    pub fn record_file(&self, lines: u64, bytes: u64, records: u64, longest_line: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        self.lines_read.fetch_add(lines, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
        self.records_matched.fetch_add(records, Ordering::Relaxed);
        self.longest_line.fetch_max(longest_line, Ordering::Relaxed);
        debug!(
            "File scanned: {} lines, {} bytes, {} records",
            lines, bytes, records
        );
    }

    /// Records a file that produced a failure outcome
    pub fn record_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets a snapshot of the counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            lines_read: self.lines_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            records_matched: self.records_matched.load(Ordering::Relaxed),
            longest_line: self.longest_line.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Files scanned/failed: {}/{}\n\
             Lines read: {}\n\
             Bytes read: {}\n\
             Records matched: {}\n\
             Longest line: {} bytes",
            stats.files_scanned,
            stats.files_failed,
            stats.lines_read,
            stats.bytes_read,
            stats.records_matched,
            stats.longest_line
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: u64,
    pub files_failed: u64,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub records_matched: u64,
    pub longest_line: u64,
}
