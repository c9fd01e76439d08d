//! Cache writers
//!
//! The pipeline only sees [`CacheWriter`]; whether writes reach memcached or
//! are just logged is decided once by [`build_writer`].

mod memcached;

pub use memcached::{validate_key, MemcacheWriter, MAX_KEY_LEN};

use async_trait::async_trait;
use memc_common::{CacheKey, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::LoaderConfig;
use crate::encoder::decode_payload;

/// Stores one encoded record in the partition at `addr`.
///
/// One call is one attempt with one outcome; callers never retry.
#[async_trait]
pub trait CacheWriter: Send + Sync {
    async fn write(&self, addr: &str, key: &CacheKey, payload: &[u8]) -> Result<()>;
}

/// Logs what would have been written and always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunWriter;

#[async_trait]
impl CacheWriter for DryRunWriter {
    async fn write(&self, addr: &str, key: &CacheKey, payload: &[u8]) -> Result<()> {
        match decode_payload(payload) {
            Ok(apps) => info!(
                addr,
                key = %key,
                lat = ?apps.lat,
                lon = ?apps.lon,
                apps = ?apps.apps,
                "Dry run write"
            ),
            Err(e) => warn!(addr, key = %key, error = %e, "Dry run write with undecodable payload"),
        }
        Ok(())
    }
}

/// Pick the writer for this run based on the dry-run flag.
pub fn build_writer(config: &LoaderConfig) -> Arc<dyn CacheWriter> {
    if config.dry_run {
        Arc::new(DryRunWriter)
    } else {
        Arc::new(MemcacheWriter::new(config.write_timeout, config.max_workers))
    }
}
