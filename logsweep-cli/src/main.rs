use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use logsweep::{
    config::DEFAULT_PATTERN, BatchSummary, ConfigOverrides, EncodingMode, FileOutcome,
    PredicateConfig, PredicateKind, ScanConfig, ScanError, ScanStats, WorkerPool,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ScanError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log files to scan; arguments containing *, ? or [ are expanded as globs
    #[arg(required = true)]
    paths: Vec<String>,

    /// Pattern a line must contain to be reported (default: ERROR)
    #[arg(short = 'p', long)]
    pattern: Option<String>,

    /// Treat the pattern as a regular expression
    #[arg(short = 'r', long)]
    regex: bool,

    /// Number of parallel workers (default: CPU cores minus one)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Read buffer size per file, in bytes
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Finished files that may wait for output (0 for unbounded)
    #[arg(long)]
    result_capacity: Option<usize>,

    /// How to handle invalid UTF-8 sequences (lossy|failfast)
    #[arg(long)]
    encoding: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print one JSON object per file instead of alerts
    #[arg(long)]
    json: bool,

    /// Show only the summary, not individual alerts
    #[arg(short, long)]
    stats: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = ScanConfig::load_from(cli.config.as_deref())
        .map_err(|e| ScanError::config_error(e.to_string()))?
        .merge_with_cli(overrides_from(&cli)?);

    init_logging(&config.log_level);

    let paths = expand_paths(&cli.paths)?;
    let pool = WorkerPool::new(&config)?;

    let started = Instant::now();
    let stream = pool.run_batch(paths)?;
    let metrics = stream.metrics().clone();
    let reporter = Reporter::new(&cli, stream.expected() as u64);

    let mut summary = BatchSummary::new();
    let mut fault = None;
    for outcome in stream {
        match outcome {
            Ok(outcome) => {
                summary.add_outcome(&outcome);
                reporter.outcome(&outcome)?;
            }
            Err(e) => {
                reporter.fault(&e);
                if fault.is_none() {
                    fault = Some(e);
                }
            }
        }
        reporter.tick();
    }
    reporter.finish();

    print_summary(&summary, &metrics.get_stats(), started.elapsed(), cli.json);

    match fault {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn overrides_from(cli: &Cli) -> Result<ConfigOverrides> {
    let predicate = if cli.pattern.is_some() || cli.regex {
        Some(PredicateConfig {
            kind: if cli.regex {
                PredicateKind::Regex
            } else {
                PredicateKind::Substring
            },
            pattern: cli
                .pattern
                .clone()
                .unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
        })
    } else {
        None
    };

    let encoding_mode = match cli.encoding.as_deref().map(str::to_lowercase).as_deref() {
        None => None,
        Some("lossy") => Some(EncodingMode::Lossy),
        Some("failfast") => Some(EncodingMode::FailFast),
        Some(other) => {
            return Err(ScanError::config_error(format!(
                "Unknown encoding mode '{}' (expected lossy or failfast)",
                other
            )))
        }
    };

    Ok(ConfigOverrides {
        worker_count: cli.threads,
        read_buffer_size: cli.buffer_size,
        predicate,
        encoding_mode,
        result_capacity: cli.result_capacity,
        log_level: cli.log_level.clone(),
    })
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Turns command-line arguments into the list of files to scan
fn expand_paths(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for arg in args {
        if !arg.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(arg));
            continue;
        }

        let entries = glob::glob(arg)
            .map_err(|e| ScanError::config_error(format!("Invalid glob '{}': {}", arg, e)))?;
        let before = paths.len();
        for entry in entries {
            paths.push(entry.map_err(|e| ScanError::IoError(e.into_error()))?);
        }
        if paths.len() == before {
            warn!("Glob '{}' matched no files", arg);
        }
    }
    Ok(paths)
}

/// Writes outcomes to stdout, keeping the optional progress bar intact
struct Reporter {
    progress: Option<ProgressBar>,
    json: bool,
    stats_only: bool,
}

impl Reporter {
    fn new(cli: &Cli, total: u64) -> Self {
        let progress = cli.progress.then(|| {
            let bar = ProgressBar::new(total);
            if let Ok(style) =
                ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} files")
            {
                bar.set_style(style);
            }
            bar
        });
        Self {
            progress,
            json: cli.json,
            stats_only: cli.stats,
        }
    }

    fn line(&self, text: String) {
        match &self.progress {
            Some(bar) => bar.println(text),
            None => println!("{}", text),
        }
    }

    fn outcome(&self, outcome: &FileOutcome) -> Result<()> {
        if self.stats_only {
            return Ok(());
        }

        if self.json {
            let text = serde_json::to_string(outcome)
                .map_err(|e| ScanError::output_error(e.to_string()))?;
            self.line(text);
            return Ok(());
        }

        match outcome {
            FileOutcome::Matched { records, .. } => {
                for record in records {
                    self.line(format!("{} {}", "Alert:".red().bold(), record));
                }
            }
            FileOutcome::Failed { source, failure } => {
                self.line(
                    format!("FAILED: {} - {}", source.display(), failure)
                        .yellow()
                        .to_string(),
                );
            }
        }
        Ok(())
    }

    fn fault(&self, err: &ScanError) {
        let text = format!("{} {}", "Batch fault:".red().bold(), err);
        match &self.progress {
            Some(bar) => bar.suspend(|| eprintln!("{}", text)),
            None => eprintln!("{}", text),
        }
    }

    fn tick(&self) {
        if let Some(bar) = &self.progress {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
    }
}

fn print_summary(summary: &BatchSummary, stats: &ScanStats, elapsed: Duration, to_stderr: bool) {
    let elapsed = Duration::from_millis(elapsed.as_millis() as u64);
    let text = format!(
        "Scanned {} files in {}: {} alerts in {} files, {} failed ({} lines, {} bytes read)",
        summary.files_scanned,
        humantime::format_duration(elapsed),
        summary.total_records,
        summary.files_with_matches,
        summary.files_failed,
        stats.lines_read,
        stats.bytes_read
    );
    if to_stderr {
        eprintln!("{}", text);
    } else {
        println!("\n{}", text);
    }
}
