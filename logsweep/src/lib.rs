pub mod config;
pub mod errors;
pub mod metrics;
pub mod pool;
pub mod results;
pub mod scan;

pub use config::{ConfigOverrides, EncodingMode, PredicateConfig, PredicateKind, ScanConfig};
pub use errors::{ScanError, ScanResult};
pub use metrics::{ScanMetrics, ScanStats};
pub use pool::{run_batch, CancellationToken, OutcomeStream, PathScanner, WorkerPool};
pub use results::{BatchSummary, FileOutcome, MatchRecord};
pub use scan::{LineScanner, LogLines, MatchPredicate};
