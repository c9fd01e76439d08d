//! MemcLoad Loader Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads gzipped, tab-separated device logs into memcached partitions, one
//! partition per device type.
//!
//! # Pipeline
//!
//! For every batch file matched by the discovery pattern:
//!
//! 1. **Read**: decompress and buffer all non-empty lines ([`source`])
//! 2. **Parse & route**: turn each line into a record and look up its
//!    partition ([`parser`], [`config::PartitionMap`])
//! 3. **Encode & write**: protobuf-encode and `set` into memcached under a
//!    bounded worker pool ([`encoder`], [`writer`], [`scheduler`])
//! 4. **Evaluate**: compare the error rate against the threshold ([`stats`])
//! 5. **Mark**: dot-prefix the file so later runs skip it ([`marker`])
//!
//! # Example
//!
//! ```no_run
//! use memc_loader::{batch::BatchProcessor, config::LoaderConfig, discovery};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(LoaderConfig::default());
//!     let batches = discovery::discover_batches("data/*.tsv.gz")?;
//!     let summary = BatchProcessor::new(config).run(&batches).await;
//!     println!("{summary:?}");
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod discovery;
pub mod encoder;
pub mod marker;
pub mod parser;
pub mod scheduler;
pub mod source;
pub mod stats;
pub mod writer;
