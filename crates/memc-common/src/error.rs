//! Error types for MemcLoad

use thiserror::Error;

/// Result type alias for MemcLoad operations
pub type Result<T> = std::result::Result<T, MemcError>;

/// Main error type for MemcLoad
#[derive(Error, Debug)]
pub enum MemcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid batch pattern: {0}")]
    Pattern(String),

    #[error("Failed to encode payload: {0}")]
    Encode(String),

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Cache write to {addr} failed: {message}")]
    Cache { addr: String, message: String },

    #[error("Cache write to {addr} timed out")]
    Timeout { addr: String },

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

impl MemcError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a cache write error for the given partition address
    pub fn cache(addr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            addr: addr.into(),
            message: message.into(),
        }
    }
}
