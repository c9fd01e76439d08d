//! memcached writer backed by the `memcache` client
//!
//! One client (with its own connection pool) is kept per partition address.
//! The client is blocking, so every call runs on tokio's blocking pool.

use async_trait::async_trait;
use memc_common::{CacheKey, MemcError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use super::CacheWriter;

/// Longest key memcached accepts.
pub const MAX_KEY_LEN: usize = 250;

/// Bound on establishing connections to a partition.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Writes records to memcached with `set <key> 0 0`.
pub struct MemcacheWriter {
    clients: Mutex<HashMap<String, Arc<memcache::Client>>>,
    timeout: Option<Duration>,
    pool_size: u32,
}

impl MemcacheWriter {
    /// `pool_size` caps open connections per address; match it to the worker
    /// count so concurrent writes do not queue on the pool.
    pub fn new(timeout: Option<Duration>, pool_size: usize) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            timeout,
            pool_size: u32::try_from(pool_size.max(1)).unwrap_or(u32::MAX),
        }
    }

    async fn client(&self, addr: &str) -> Result<Arc<memcache::Client>> {
        let cached = self
            .clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(addr)
            .cloned();
        if let Some(client) = cached {
            return Ok(client);
        }

        let url = format!("memcache://{addr}?tcp_nodelay=true");
        let (timeout, pool_size) = (self.timeout, self.pool_size);
        let client = tokio::task::spawn_blocking(move || {
            let mut builder = memcache::Client::builder()
                .add_server(url)?
                .with_max_pool_size(pool_size)
                .with_min_idle_conns(1)
                .with_connection_timeout(CONNECT_TIMEOUT);
            if let Some(limit) = timeout {
                builder = builder.with_read_timeout(limit).with_write_timeout(limit);
            }
            builder.build()
        })
        .await
        .map_err(|e| MemcError::cache(addr, e.to_string()))?
        .map_err(|e| MemcError::cache(addr, format!("connect failed: {e}")))?;

        debug!(addr, pool_size, "Connected to partition");
        let client = Arc::new(client);
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(clients.entry(addr.to_string()).or_insert(client).clone())
    }

    async fn set(&self, addr: &str, key: &CacheKey, payload: &[u8]) -> Result<()> {
        let client = self.client(addr).await?;
        let key = key.as_str().to_string();
        let payload = payload.to_vec();
        tokio::task::spawn_blocking(move || client.set(&key, payload.as_slice(), 0))
            .await
            .map_err(|e| MemcError::cache(addr, e.to_string()))?
            .map_err(|e| MemcError::cache(addr, e.to_string()))
    }
}

#[async_trait]
impl CacheWriter for MemcacheWriter {
    async fn write(&self, addr: &str, key: &CacheKey, payload: &[u8]) -> Result<()> {
        validate_key(key.as_str())?;
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.set(addr, key, payload))
                .await
                .map_err(|_| MemcError::Timeout {
                    addr: addr.to_string(),
                })?,
            None => self.set(addr, key, payload).await,
        }
    }
}

/// Keys must be at most 250 bytes with no whitespace or control characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(MemcError::InvalidKey(format!(
            "length {} outside 1..={MAX_KEY_LEN}",
            key.len()
        )));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(MemcError::InvalidKey(format!("{key:?} contains whitespace or control characters")));
    }
    Ok(())
}
