//! Cache Module
//!
//! Provides a persistent cache with TTL expiration over a pluggable store.

mod clock;
mod engine;
mod entry;
mod policy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{current_timestamp, Clock, ManualClock, SystemClock};
pub use engine::CacheEngine;
pub use entry::{expiration_timestamp, CacheEntry};
pub use policy::ExpirationPolicy;
pub use stats::CacheStats;
pub use store::{SqliteStore, Store};
