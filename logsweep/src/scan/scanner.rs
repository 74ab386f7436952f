use std::borrow::Cow;
use std::path::Path;
use tracing::{trace, warn};

use super::lines::LogLines;
use super::predicate::MatchPredicate;
use crate::config::{EncodingMode, ScanConfig, DEFAULT_READ_BUFFER_SIZE};
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::results::{FileOutcome, MatchRecord};

/// Scans one file at a time for lines accepted by a predicate
#[derive(Debug, Clone)]
pub struct LineScanner {
    predicate: MatchPredicate,
    read_buffer_size: usize,
    encoding_mode: EncodingMode,
}

impl LineScanner {
    /// Creates a new LineScanner with the given predicate
    pub fn new(
        predicate: MatchPredicate,
        read_buffer_size: usize,
        encoding_mode: EncodingMode,
    ) -> Self {
        Self {
            predicate,
            read_buffer_size,
            encoding_mode,
        }
    }

    /// Builds a scanner from configuration, compiling the predicate
    pub fn from_config(config: &ScanConfig) -> ScanResult<Self> {
        let predicate = MatchPredicate::from_config(&config.predicate)?;
        Ok(Self::new(
            predicate,
            config.read_buffer_size,
            config.encoding_mode,
        ))
    }

    pub fn predicate(&self) -> &MatchPredicate {
        &self.predicate
    }

    /// Scans `path` and converts any failure into a failed outcome.
    ///
    /// Never returns an error: a file that cannot be read to the end yields a
    /// single `Failed` outcome and any records gathered before the failure
    /// are dropped.
    pub fn scan(&self, path: &Path) -> FileOutcome {
        self.scan_with_metrics(path, &ScanMetrics::new())
    }

    /// Like [`scan`](Self::scan), recording counters into `metrics`
    pub fn scan_with_metrics(&self, path: &Path, metrics: &ScanMetrics) -> FileOutcome {
        trace!("Scanning file: {}", path.display());

        match self.scan_file(path, metrics) {
            Ok(records) => FileOutcome::matched(path, records),
            Err(e) => {
                warn!("Failed to scan {}: {}", path.display(), e);
                metrics.record_failure();
                FileOutcome::failed(path, e)
            }
        }
    }

    fn scan_file(&self, path: &Path, metrics: &ScanMetrics) -> ScanResult<Vec<MatchRecord>> {
        let mut lines = LogLines::open(path, self.read_buffer_size)
            .map_err(|e| ScanError::from_open(path, e))?;

        // File::open succeeds on directories on some platforms
        let metadata = lines
            .get_ref()
            .get_ref()
            .metadata()
            .map_err(|e| ScanError::from_open(path, e))?;
        if metadata.is_dir() {
            return Err(ScanError::not_a_file(path));
        }

        let mut records = Vec::new();
        let mut line_number = 0;
        let mut replaced = false;

        while let Some(raw) = lines
            .next_line()
            .map_err(|e| ScanError::read_error(path, e))?
        {
            line_number += 1;
            let text = match self.encoding_mode {
                EncodingMode::Lossy => {
                    let text = String::from_utf8_lossy(raw);
                    if let Cow::Owned(_) = text {
                        replaced = true;
                    }
                    text
                }
                EncodingMode::FailFast => Cow::Borrowed(
                    std::str::from_utf8(raw)
                        .map_err(|e| ScanError::encoding_error(path, line_number, e))?,
                ),
            };

            if self.predicate.is_match(&text) {
                records.push(MatchRecord::new(path, text.into_owned()));
            }
        }

        if replaced {
            warn!("Invalid UTF-8 replaced in file: {}", path.display());
        }

        metrics.record_file(
            lines.line_number() as u64,
            lines.bytes_read(),
            records.len() as u64,
            lines.longest_line() as u64,
        );

        Ok(records)
    }
}

impl Default for LineScanner {
    fn default() -> Self {
        Self::new(
            MatchPredicate::default(),
            DEFAULT_READ_BUFFER_SIZE,
            EncodingMode::Lossy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn lines_of(outcome: &FileOutcome) -> Vec<&str> {
        outcome.records().iter().map(|r| r.line.as_str()).collect()
    }

    #[test]
    fn test_scan_reports_matching_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.log");
        std::fs::write(&path, "INFO ok\nERROR disk full\nINFO done\n").unwrap();

        let outcome = LineScanner::default().scan(&path);
        assert_eq!(outcome.source(), path.as_path());
        assert_eq!(lines_of(&outcome), vec!["ERROR disk full"]);
        assert!(outcome.records().iter().all(|r| r.source == path));
    }

    #[test]
    fn test_scan_preserves_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ordered.log");
        let mut file = File::create(&path).unwrap();
        for i in 0..2000 {
            if i % 7 == 0 {
                writeln!(file, "ERROR event {}", i).unwrap();
            } else {
                writeln!(file, "INFO event {}", i).unwrap();
            }
        }
        drop(file);

        let scanner = LineScanner::new(MatchPredicate::default(), 128, EncodingMode::Lossy);
        let outcome = scanner.scan(&path);
        let expected: Vec<String> = (0..2000)
            .filter(|i| i % 7 == 0)
            .map(|i| format!("ERROR event {}", i))
            .collect();
        assert_eq!(lines_of(&outcome), expected);
    }

    #[test]
    fn test_scan_trims_crlf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("windows.log");
        std::fs::write(&path, "ERROR one\r\nINFO two\r\nERROR three").unwrap();

        let outcome = LineScanner::default().scan(&path);
        assert_eq!(lines_of(&outcome), vec!["ERROR one", "ERROR three"]);
    }

    #[test]
    fn test_scan_splits_on_bare_cr() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("classic_mac.log");
        std::fs::write(&path, "INFO a\rERROR b\rINFO c\r").unwrap();

        let metrics = ScanMetrics::new();
        let outcome = LineScanner::default().scan_with_metrics(&path, &metrics);
        assert_eq!(lines_of(&outcome), vec!["ERROR b"]);
        assert_eq!(metrics.get_stats().lines_read, 3);
        assert_eq!(metrics.get_stats().bytes_read, 22);
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.log");

        let metrics = ScanMetrics::new();
        let outcome = LineScanner::default().scan_with_metrics(&path, &metrics);
        assert!(outcome.is_failure());
        assert!(outcome.failure().unwrap().contains("File not found"));
        assert_eq!(metrics.get_stats().files_failed, 1);
        assert_eq!(metrics.get_stats().files_scanned, 0);
    }

    #[test]
    fn test_directory_fails() {
        let dir = tempdir().unwrap();
        let outcome = LineScanner::default().scan(dir.path());
        assert!(outcome.is_failure());
        assert_eq!(outcome.source(), dir.path());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_checked_through_open_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.log");
        std::fs::write(&path, "ERROR a\n").unwrap();

        let lines = LogLines::open(&path, 64).unwrap();
        // Deleting the path after open must not affect the handle's metadata
        std::fs::remove_file(&path).unwrap();
        let metadata = lines.get_ref().get_ref().metadata().unwrap();
        assert!(metadata.is_file());
        assert_eq!(metadata.len(), 8);
    }

    #[test]
    fn test_lossy_decoding_keeps_scanning() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noisy.log");
        let mut content = b"ERROR bad byte \xff here\n".to_vec();
        content.extend_from_slice(b"INFO \xfe\xfe\n");
        content.extend_from_slice(b"ERROR after noise\n");
        std::fs::write(&path, content).unwrap();

        let outcome = LineScanner::default().scan(&path);
        assert_eq!(
            lines_of(&outcome),
            vec!["ERROR bad byte \u{FFFD} here", "ERROR after noise"]
        );
    }

    #[test]
    fn test_failfast_decoding_fails_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noisy.log");
        std::fs::write(&path, b"ERROR fine\nERROR \xff\n").unwrap();

        let scanner = LineScanner::new(MatchPredicate::default(), 1024, EncodingMode::FailFast);
        let outcome = scanner.scan(&path);
        assert!(outcome.is_failure());
        assert!(outcome.records().is_empty());
        assert!(outcome.failure().unwrap().contains("line 2"));
    }

    #[test]
    fn test_rescan_is_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stable.log");
        std::fs::write(&path, "ERROR a\nINFO b\nERROR c\n").unwrap();

        let scanner = LineScanner::default();
        assert_eq!(scanner.scan(&path), scanner.scan(&path));
    }

    #[test]
    fn test_metrics_recorded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.log");
        std::fs::write(&path, "ERROR a\nINFO b\n").unwrap();

        let metrics = ScanMetrics::new();
        LineScanner::default().scan_with_metrics(&path, &metrics);
        let stats = metrics.get_stats();
        assert_eq!(stats.files_scanned, 1);
        assert_eq!(stats.lines_read, 2);
        assert_eq!(stats.bytes_read, 15);
        assert_eq!(stats.records_matched, 1);
    }
}
