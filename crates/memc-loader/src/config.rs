//! Loader configuration
//!
//! Built once before the first batch and shared read-only (behind an `Arc`)
//! by every batch and worker.

use memc_common::{MemcError, Result, KNOWN_DEVICE_TYPES};
use std::collections::HashMap;
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

/// Default glob for batch discovery.
pub const DEFAULT_PATTERN: &str = "data/*.tsv.gz";

/// Default number of concurrent encode+write units per batch.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// A batch is accepted while `errors / processed` stays below this.
pub const NORMAL_ERR_RATE: f64 = 0.01;

/// Default memcached address per known device type.
pub const DEFAULT_PARTITIONS: [(&str, &str); 4] = [
    ("idfa", "127.0.0.1:33013"),
    ("gaid", "127.0.0.1:33014"),
    ("adid", "127.0.0.1:33015"),
    ("dvid", "127.0.0.1:33016"),
];

/// Device type to memcached address mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionMap {
    addresses: HashMap<String, String>,
}

impl PartitionMap {
    /// Partition map for the four known device types on localhost.
    pub fn with_defaults() -> Self {
        Self::from_pairs(DEFAULT_PARTITIONS)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            addresses: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Address of the partition serving `device_type`, if any.
    pub fn address(&self, device_type: &str) -> Option<&str> {
        self.addresses.get(device_type).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.addresses.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Main loader configuration
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Where each device type is written
    pub partitions: PartitionMap,
    /// Concurrency ceiling for encode+write units within one batch
    pub max_workers: usize,
    /// Log writes instead of sending them
    pub dry_run: bool,
    /// Batches at or above this error rate are reported as failed loads
    pub error_rate_threshold: f64,
    /// Upper bound for a single cache write; `None` waits indefinitely
    pub write_timeout: Option<Duration>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            partitions: PartitionMap::with_defaults(),
            max_workers: DEFAULT_MAX_WORKERS,
            dry_run: false,
            error_rate_threshold: NORMAL_ERR_RATE,
            write_timeout: None,
        }
    }
}

impl LoaderConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(MemcError::config("max_workers must be greater than 0"));
        }
        if self.partitions.is_empty() {
            return Err(MemcError::config("at least one partition address is required"));
        }
        for (device_type, addr) in self.partitions.iter() {
            if addr.trim().is_empty() {
                return Err(MemcError::config(format!(
                    "address for device type '{device_type}' is empty"
                )));
            }
        }
        if !(self.error_rate_threshold > 0.0 && self.error_rate_threshold <= 1.0) {
            return Err(MemcError::config(format!(
                "error rate threshold must be in (0, 1], got {}",
                self.error_rate_threshold
            )));
        }
        if matches!(self.write_timeout, Some(t) if t.is_zero()) {
            return Err(MemcError::config("write timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Device types from [`KNOWN_DEVICE_TYPES`] with no partition configured.
    pub fn unrouted_device_types(&self) -> Vec<&'static str> {
        KNOWN_DEVICE_TYPES
            .iter()
            .copied()
            .filter(|t| self.partitions.address(t).is_none())
            .collect()
    }
}
