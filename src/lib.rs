//! SQLite TTL Cache - An embedded, persistent key-value cache
//!
//! Stores JSON-representable values under string keys with time-based
//! expiration, swept either by a background task or lazily before reads.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheEngine, CacheStats, ExpirationPolicy, SqliteStore, Store};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
