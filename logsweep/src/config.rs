use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Default size of the per-file read buffer (1 MiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Default number of finished outcomes that may wait for the consumer.
pub const DEFAULT_RESULT_CAPACITY: usize = 64;

/// Default match pattern.
pub const DEFAULT_PATTERN: &str = "ERROR";

/// Configuration for a scan batch.
///
/// # Configuration Locations
///
/// Configuration is merged from these locations, later entries winning:
/// 1. Global `$HOME/.config/logsweep/config.yaml`
/// 2. Local `.logsweep.yaml` in the current directory
/// 3. Custom config file specified via `--config` flag
///
/// # Configuration Format
///
/// ```yaml
/// # Parallel workers (default: CPU cores minus one)
/// worker_count: 4
///
/// # Read buffer per open file, in bytes
/// read_buffer_size: 1048576
///
/// # Line predicate
/// predicate:
///   kind: substring   # or "regex"
///   pattern: "ERROR"
///
/// # Invalid UTF-8 handling (lossy, failfast)
/// encoding_mode: lossy
///
/// # Finished outcomes buffered for a slow consumer (0 = unbounded)
/// result_capacity: 64
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of parallel workers
    #[serde(default = "default_worker_count")]
    pub worker_count: NonZeroUsize,

    /// Capacity of the buffered reader used for each file
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Predicate deciding which lines are reported
    #[serde(default)]
    pub predicate: PredicateConfig,

    /// How to handle bytes that are not valid UTF-8
    #[serde(default)]
    pub encoding_mode: EncodingMode,

    /// Bound on completed-but-unconsumed outcomes; 0 disables the bound
    #[serde(default = "default_result_capacity")]
    pub result_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Controls how invalid UTF-8 sequences are handled during scanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Replace invalid sequences with U+FFFD and keep scanning
    #[default]
    Lossy,
    /// Fail the file on the first invalid sequence
    FailFast,
}

/// Which kind of matching the predicate performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    /// Case-sensitive literal substring
    #[default]
    Substring,
    /// Regular expression, matched anywhere in the line
    Regex,
}

/// Serializable description of the line predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateConfig {
    #[serde(default)]
    pub kind: PredicateKind,
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for PredicateConfig {
    fn default() -> Self {
        Self {
            kind: PredicateKind::Substring,
            pattern: default_pattern(),
        }
    }
}

/// Values supplied on the command line. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub worker_count: Option<NonZeroUsize>,
    pub read_buffer_size: Option<usize>,
    pub predicate: Option<PredicateConfig>,
    pub encoding_mode: Option<EncodingMode>,
    pub result_capacity: Option<usize>,
    pub log_level: Option<String>,
}

/// Available parallelism minus one, never below one.
pub fn default_worker_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().saturating_sub(1)).unwrap_or(NonZeroUsize::MIN)
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

fn default_result_capacity() -> usize {
    DEFAULT_RESULT_CAPACITY
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            read_buffer_size: default_read_buffer_size(),
            predicate: PredicateConfig::default(),
            encoding_mode: EncodingMode::default(),
            result_capacity: default_result_capacity(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, layering an explicit file over the default locations.
    /// A missing explicit file is an error; missing default files are skipped.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("logsweep/config.yaml")),
            Some(PathBuf::from(".logsweep.yaml")),
        ];

        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(worker_count) = cli.worker_count {
            self.worker_count = worker_count;
        }
        if let Some(size) = cli.read_buffer_size {
            self.read_buffer_size = size;
        }
        if let Some(predicate) = cli.predicate {
            self.predicate = predicate;
        }
        if let Some(mode) = cli.encoding_mode {
            self.encoding_mode = mode;
        }
        if let Some(capacity) = cli.result_capacity {
            self.result_capacity = capacity;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }
}
