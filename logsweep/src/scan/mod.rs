/// Per-file scanning.
///
/// A file is never read whole. `LogLines` wraps the file in a `BufReader` of
/// `read_buffer_size` bytes and hands out one line at a time from a reused
/// buffer, so peak memory per worker is the read buffer plus the longest line:
/// ```rust,ignore
/// let mut lines = LogLines::open(path, 1024 * 1024)?;
/// while let Some(raw) = lines.next_line()? {
///     let text = String::from_utf8_lossy(raw);
///     if predicate.is_match(&text) { /* keep it */ }
/// }
/// ```
///
/// `LineScanner::scan` never returns an error. Open failures, read failures
/// and (in fail-fast mode) invalid UTF-8 all collapse into a single
/// `FileOutcome::Failed` for that file, and records gathered before the
/// failure are discarded.
pub mod lines;
pub mod predicate;
pub mod scanner;

pub use lines::LogLines;
pub use predicate::{MatchPredicate, MatchStrategy};
pub use scanner::LineScanner;
