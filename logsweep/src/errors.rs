/// Error types for logsweep.
///
/// Two layers of failure exist and they travel differently:
///
/// 1. **File-level failures** (missing file, permission denied, a read that
///    dies halfway through) are recovered inside the scanner and handed to the
///    caller as data, in the form of a failed `FileOutcome`:
///    ```rust,ignore
///    for outcome in stream {
///        match outcome? {
///            FileOutcome::Matched { records, .. } => // render alerts,
///            FileOutcome::Failed { source, failure } => // report the file,
///        }
///    }
///    ```
///
/// 2. **Batch-level faults** (a worker panicking, the pool failing to start)
///    break the "one outcome per path" guarantee and therefore surface as
///    `Err(ScanError)` items of the outcome stream.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while scanning log files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),
    #[error("Failed to open {path}: {source}")]
    OpenError { path: PathBuf, source: io::Error },
    #[error("Read failed in {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("Invalid UTF-8 in file {path} at line {line_number}: {source}")]
    EncodingError {
        path: PathBuf,
        line_number: usize,
        source: std::str::Utf8Error,
    },
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to start worker pool: {0}")]
    PoolBuild(String),
    #[error("Worker panicked while scanning {path}: {message}")]
    WorkerPanicked { path: PathBuf, message: String },
    #[error("Batch ended after {received} of {expected} outcomes")]
    BatchDisconnected { expected: usize, received: usize },
    #[error("Output error: {0}")]
    OutputError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl ScanError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn not_a_file(path: impl Into<PathBuf>) -> Self {
        Self::NotAFile(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn read_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn encoding_error(
        path: impl Into<PathBuf>,
        line_number: usize,
        source: std::str::Utf8Error,
    ) -> Self {
        Self::EncodingError {
            path: path.into(),
            line_number,
            source,
        }
    }

    pub fn output_error(msg: impl Into<String>) -> Self {
        Self::OutputError(msg.into())
    }

    pub fn worker_panicked(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::WorkerPanicked {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classifies an error raised while opening `path`.
    pub fn from_open(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::OpenError { path, source: err },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let path = Path::new("node_1.log");
        let err = ScanError::file_not_found(path);
        assert!(matches!(err, ScanError::FileNotFound(_)));

        let err = ScanError::permission_denied(path);
        assert!(matches!(err, ScanError::PermissionDenied(_)));

        let err = ScanError::invalid_pattern("ERROR(");
        assert!(matches!(err, ScanError::InvalidPattern(_)));

        let err = ScanError::worker_panicked(path, "boom");
        assert!(matches!(err, ScanError::WorkerPanicked { .. }));
    }

    #[test]
    fn test_output_error_message() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ScanError::output_error(json_err.to_string());
        assert!(matches!(err, ScanError::OutputError(_)));
        assert!(err.to_string().starts_with("Output error: "));
        assert!(!err.to_string().contains("IO error"));
    }

    #[test]
    fn test_open_error_classification() {
        let err = ScanError::from_open("a.log", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ScanError::FileNotFound(_)));

        let err = ScanError::from_open(
            "a.log",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, ScanError::PermissionDenied(_)));

        let err = ScanError::from_open("a.log", io::Error::other("device gone"));
        assert!(matches!(err, ScanError::OpenError { .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = ScanError::file_not_found("c.log");
        assert_eq!(err.to_string(), "File not found: c.log");

        let err = ScanError::config_error("worker_count must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: worker_count must be positive"
        );

        let err = ScanError::BatchDisconnected {
            expected: 3,
            received: 1,
        };
        assert_eq!(err.to_string(), "Batch ended after 1 of 3 outcomes");
    }
}
