/// Result types produced by a scan batch.
///
/// Every value here is owned: a worker builds a `FileOutcome`, moves it into
/// the result channel, and from then on the consumer owns it outright. No
/// reference back into the worker or the file survives the hand-off, so the
/// file handle is long closed by the time a record is rendered.
///
/// ```rust,ignore
/// let mut summary = BatchSummary::new();
/// for outcome in stream {
///     let outcome = outcome?;
///     summary.add_outcome(&outcome);
///     for record in outcome.records() {
///         println!("Alert: {}", record); // "{source} -> {line}"
///     }
/// }
/// ```
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One line accepted by the predicate, tagged with its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    /// The file the line was read from
    pub source: PathBuf,
    /// The line, without its trailing line terminator
    pub line: String,
}

impl MatchRecord {
    pub fn new(source: impl Into<PathBuf>, line: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            line: line.into(),
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.line)
    }
}

/// The result of scanning one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file was read to the end; `records` may be empty
    Matched {
        source: PathBuf,
        records: Vec<MatchRecord>,
    },
    /// The file could not be fully scanned
    Failed { source: PathBuf, failure: String },
}

impl FileOutcome {
    pub fn matched(source: impl Into<PathBuf>, records: Vec<MatchRecord>) -> Self {
        Self::Matched {
            source: source.into(),
            records,
        }
    }

    pub fn failed(source: impl Into<PathBuf>, failure: impl fmt::Display) -> Self {
        Self::Failed {
            source: source.into(),
            failure: failure.to_string(),
        }
    }

    /// The path this outcome belongs to
    pub fn source(&self) -> &Path {
        match self {
            Self::Matched { source, .. } | Self::Failed { source, .. } => source,
        }
    }

    /// Matched records; empty for failures
    pub fn records(&self) -> &[MatchRecord] {
        match self {
            Self::Matched { records, .. } => records,
            Self::Failed { .. } => &[],
        }
    }

    /// Failure description, if the file could not be scanned
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed { failure, .. } => Some(failure),
            Self::Matched { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Running totals over the outcomes a consumer has received
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Outcomes received, successful or not
    pub files_scanned: usize,
    /// Successful outcomes with at least one record
    pub files_with_matches: usize,
    /// Failed outcomes
    pub files_failed: usize,
    /// Records across all successful outcomes
    pub total_records: usize,
}

impl BatchSummary {
    /// Creates a new empty summary
    pub fn new() -> Self {
        Default::default()
    }

    /// Counts one outcome
    pub fn add_outcome(&mut self, outcome: &FileOutcome) {
        self.files_scanned += 1;
        match outcome {
            FileOutcome::Matched { records, .. } => {
                if !records.is_empty() {
                    self.files_with_matches += 1;
                    self.total_records += records.len();
                }
            }
            FileOutcome::Failed { .. } => self.files_failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_display() {
        let record = MatchRecord::new("/var/log/node_1.log", "ERROR disk full");
        assert_eq!(record.to_string(), "/var/log/node_1.log -> ERROR disk full");
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = FileOutcome::matched(
            "a.log",
            vec![MatchRecord::new("a.log", "ERROR disk full")],
        );
        assert_eq!(ok.source(), Path::new("a.log"));
        assert_eq!(ok.records().len(), 1);
        assert!(ok.failure().is_none());
        assert!(!ok.is_failure());

        let failed = FileOutcome::failed("c.log", "File not found: c.log");
        assert_eq!(failed.source(), Path::new("c.log"));
        assert!(failed.records().is_empty());
        assert_eq!(failed.failure(), Some("File not found: c.log"));
        assert!(failed.is_failure());
    }

    #[test]
    fn test_summary_add_outcome() {
        let mut summary = BatchSummary::new();

        summary.add_outcome(&FileOutcome::matched(
            "a.log",
            vec![
                MatchRecord::new("a.log", "ERROR one"),
                MatchRecord::new("a.log", "ERROR two"),
            ],
        ));
        summary.add_outcome(&FileOutcome::matched("quiet.log", vec![]));
        summary.add_outcome(&FileOutcome::failed("c.log", "missing"));

        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.files_with_matches, 1);
        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.total_records, 2);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = FileOutcome::failed("c.log", "missing");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["source"], "c.log");
        assert_eq!(json["failure"], "missing");
    }
}
