//! Batch orchestration
//!
//! One batch goes through: read all lines, parse and route each line,
//! encode+write routed records under the worker pool, join, evaluate the
//! error rate, and mark the file as processed. Batches run one after another.

use memc_common::{AppsInstalled, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::config::LoaderConfig;
use crate::encoder::encode_record;
use crate::marker::dot_rename;
use crate::parser::parse_line;
use crate::scheduler::WorkerPool;
use crate::source::read_batch_lines;
use crate::stats::{BatchStats, LoadVerdict, StatsSnapshot};
use crate::writer::{build_writer, CacheWriter};

/// Malformed lines logged at `warn` per batch; the rest go to `debug`.
const MALFORMED_SAMPLE_SIZE: u64 = 10;

/// What happened to one batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The batch could not be read; it was neither loaded nor marked.
    Skipped { path: PathBuf, reason: String },
    /// The batch was read, loaded and evaluated.
    Completed {
        path: PathBuf,
        lines: usize,
        stats: StatsSnapshot,
        verdict: LoadVerdict,
        /// New location after marking, `None` if the rename failed
        marked: Option<PathBuf>,
    },
}

/// Totals across all batches of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub empty: usize,
    pub skipped: usize,
    pub unmarked: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &BatchOutcome) {
        match outcome {
            BatchOutcome::Skipped { .. } => self.skipped += 1,
            BatchOutcome::Completed {
                verdict, marked, ..
            } => {
                match verdict {
                    LoadVerdict::Accepted { .. } => self.accepted += 1,
                    LoadVerdict::Rejected { .. } => self.rejected += 1,
                    LoadVerdict::Empty => self.empty += 1,
                }
                if marked.is_none() {
                    self.unmarked += 1;
                }
            },
        }
    }
}

/// Runs batches against a fixed configuration and cache writer.
pub struct BatchProcessor {
    config: Arc<LoaderConfig>,
    writer: Arc<dyn CacheWriter>,
}

impl BatchProcessor {
    /// Processor with the writer selected by `config.dry_run`.
    pub fn new(config: Arc<LoaderConfig>) -> Self {
        let writer = build_writer(&config);
        Self { config, writer }
    }

    pub fn with_writer(config: Arc<LoaderConfig>, writer: Arc<dyn CacheWriter>) -> Self {
        Self { config, writer }
    }

    /// Process `batches` strictly in order.
    pub async fn run(&self, batches: &[PathBuf]) -> RunSummary {
        let mut summary = RunSummary {
            discovered: batches.len(),
            ..Default::default()
        };
        info!(batches = batches.len(), dry_run = self.config.dry_run, "Starting load");

        for path in batches {
            let outcome = self.process_batch(path).await;
            summary.record(&outcome);
        }
        summary
    }

    /// Read, load, evaluate and mark a single batch.
    #[instrument(skip_all, fields(batch = %path.display()))]
    pub async fn process_batch(&self, path: &Path) -> BatchOutcome {
        info!("Processing batch");
        let started = Instant::now();

        let lines = match read_batch_lines(path).await {
            Ok(lines) => lines,
            Err(e) => {
                error!(error = %e, "Cannot read batch, skipping");
                return BatchOutcome::Skipped {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                };
            },
        };
        let line_count = lines.len();

        let stats = self.load_lines(lines).await;
        let verdict = stats.verdict(self.config.error_rate_threshold);
        match verdict {
            LoadVerdict::Accepted { error_rate } => {
                info!(
                    error_rate,
                    processed = stats.processed,
                    errors = stats.errors,
                    "Acceptable error rate. Successful load"
                );
            },
            LoadVerdict::Rejected { error_rate } => {
                error!(
                    error_rate,
                    threshold = self.config.error_rate_threshold,
                    processed = stats.processed,
                    errors = stats.errors,
                    "High error rate. Failed load"
                );
            },
            LoadVerdict::Empty => {
                debug!(errors = stats.errors, "No records loaded");
            },
        }

        let marked = match dot_rename(path) {
            Ok(marked) => Some(marked),
            Err(e) => {
                error!(error = %e, "Failed to mark batch as processed");
                None
            },
        };

        debug!(
            lines = line_count,
            elapsed = ?started.elapsed(),
            "Batch finished"
        );

        BatchOutcome::Completed {
            path: path.to_path_buf(),
            lines: line_count,
            stats,
            verdict,
            marked,
        }
    }

    /// Parse, route and write `lines`, returning the counts once every
    /// dispatched write has finished. Each line adds exactly one to either
    /// `processed` or `errors`.
    pub async fn load_lines(&self, lines: Vec<String>) -> StatsSnapshot {
        let stats = Arc::new(BatchStats::new());
        let mut pool = WorkerPool::new(self.config.max_workers);
        let mut malformed = 0u64;

        for line in lines {
            let record = match parse_line(&line) {
                Ok(record) => record,
                Err(e) => {
                    malformed += 1;
                    if malformed <= MALFORMED_SAMPLE_SIZE {
                        warn!(error = %e, line = %line, "Malformed record");
                    } else {
                        debug!(error = %e, line = %line, "Malformed record");
                    }
                    stats.record_error();
                    continue;
                },
            };

            let Some(addr) = self.config.partitions.address(&record.device_type) else {
                warn!(device_type = %record.device_type, "Unknown device type");
                stats.record_error();
                continue;
            };

            let addr = addr.to_string();
            let writer = self.writer.clone();
            let unit_stats = stats.clone();
            let unit = async move {
                match store_record(writer.as_ref(), &addr, &record).await {
                    Ok(()) => unit_stats.record_success(),
                    Err(e) => {
                        error!(addr = %addr, key = %record.cache_key(), error = %e, "Insert error");
                        unit_stats.record_error();
                    },
                }
            };

            if let Err(e) = pool.submit(unit.in_current_span()).await {
                error!(error = %e, "Worker pool unavailable");
                stats.record_error();
            }
        }

        let lost = pool.join().await;
        stats.record_errors(lost);
        stats.snapshot()
    }
}

/// Encode `record` and write it under its cache key.
async fn store_record(writer: &dyn CacheWriter, addr: &str, record: &AppsInstalled) -> Result<()> {
    let payload = encode_record(record)?;
    writer.write(addr, &record.cache_key(), &payload).await
}
