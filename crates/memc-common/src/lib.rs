//! MemcLoad Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging bootstrap, and error handling for the MemcLoad
//! workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`MemcError`] and the crate-wide [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Types**: the parsed [`AppsInstalled`] record and its [`CacheKey`]
//!
//! # Example
//!
//! ```no_run
//! use memc_common::{AppsInstalled, CacheKey};
//!
//! let record = AppsInstalled {
//!     device_type: "idfa".to_string(),
//!     device_id: "e7e1a50c0ec2747ca56cd9e1558c0d7c".to_string(),
//!     lat: 55.55,
//!     lon: 37.37,
//!     apps: vec![1, 2, 3],
//! };
//! let key: CacheKey = record.cache_key();
//! assert_eq!(key.as_str(), "idfa:e7e1a50c0ec2747ca56cd9e1558c0d7c");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{MemcError, Result};
pub use types::{AppsInstalled, CacheKey, KNOWN_DEVICE_TYPES};
