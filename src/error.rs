//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// A missing key is never an error: lookups return `Ok(None)` and deletes of
/// absent keys succeed silently.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The durable store could not be opened or queried
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// A value passed to `put` could not be encoded
    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A persisted value could not be decoded
    #[error("Corrupt entry for key '{key}': {source}")]
    CorruptEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Background sweep requested outside of a tokio runtime
    #[error("Background sweep requires a running tokio runtime")]
    RuntimeUnavailable,

    /// Configuration values that cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
