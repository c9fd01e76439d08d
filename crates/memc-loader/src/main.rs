//! MemcLoad - load device app logs into memcached

use anyhow::{Context, Result};
use clap::Parser;
use memc_common::logging::{init_logging, LogConfig, LogLevel};
use memc_loader::batch::BatchProcessor;
use memc_loader::config::{LoaderConfig, PartitionMap, DEFAULT_MAX_WORKERS, NORMAL_ERR_RATE};
use memc_loader::discovery::discover_batches;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "memc-loader")]
#[command(author, version, about = "Load gzipped device/app logs into memcached")]
struct Cli {
    /// Glob matching the batch files to load
    #[arg(long, env = "MEMC_PATTERN", default_value = memc_loader::config::DEFAULT_PATTERN)]
    pattern: String,

    /// memcached address for IDFA devices
    #[arg(long, env = "MEMC_IDFA", default_value = "127.0.0.1:33013")]
    idfa: String,

    /// memcached address for GAID devices
    #[arg(long, env = "MEMC_GAID", default_value = "127.0.0.1:33014")]
    gaid: String,

    /// memcached address for ADID devices
    #[arg(long, env = "MEMC_ADID", default_value = "127.0.0.1:33015")]
    adid: String,

    /// memcached address for DVID devices
    #[arg(long, env = "MEMC_DVID", default_value = "127.0.0.1:33016")]
    dvid: String,

    /// Log writes instead of sending them
    #[arg(long, env = "MEMC_DRY")]
    dry: bool,

    /// Concurrent writes per batch
    #[arg(long, env = "MEMC_WORKERS", default_value_t = DEFAULT_MAX_WORKERS)]
    workers: usize,

    /// Batches at or above this error rate are reported as failed
    #[arg(long, env = "MEMC_ERROR_RATE", default_value_t = NORMAL_ERR_RATE)]
    error_rate: f64,

    /// Give up on a single write after this many seconds (waits forever if unset)
    #[arg(long, env = "MEMC_WRITE_TIMEOUT_SECS")]
    write_timeout_secs: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            // A blank address leaves that device type unrouted
            partitions: PartitionMap::from_pairs(
                [
                    ("idfa", self.idfa.as_str()),
                    ("gaid", self.gaid.as_str()),
                    ("adid", self.adid.as_str()),
                    ("dvid", self.dvid.as_str()),
                ]
                .into_iter()
                .filter(|(_, addr)| !addr.trim().is_empty()),
            ),
            max_workers: self.workers,
            dry_run: self.dry,
            error_rate_threshold: self.error_rate,
            write_timeout: self.write_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    // Environment variables take precedence over the flag
    let log_config = LogConfig {
        level: log_level,
        ..Default::default()
    }
    .merge_env()?;
    let _log_guard = init_logging(&log_config)?;

    let config = cli.loader_config();
    config.validate().context("Invalid loader configuration")?;
    info!(
        pattern = %cli.pattern,
        workers = config.max_workers,
        dry_run = config.dry_run,
        "Loader configured"
    );

    let unrouted = config.unrouted_device_types();
    if !unrouted.is_empty() {
        warn!(device_types = ?unrouted, "No partition configured; these records will count as errors");
    }

    let batches = discover_batches(&cli.pattern)?;
    if batches.is_empty() {
        warn!(pattern = %cli.pattern, "No batches matched");
    }

    let summary = BatchProcessor::new(Arc::new(config)).run(&batches).await;
    info!(
        discovered = summary.discovered,
        accepted = summary.accepted,
        rejected = summary.rejected,
        empty = summary.empty,
        skipped = summary.skipped,
        unmarked = summary.unmarked,
        "Load complete"
    );
    Ok(())
}
