//! Cache Entry Module
//!
//! Defines the persisted shape of a cache entry and its expiration arithmetic.

// == Cache Entry ==
/// A row as held by the store: the encoded value plus its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The value, JSON-encoded
    pub value: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl_seconds` after `now`.
    pub fn new(value: String, now: i64, ttl_seconds: u64) -> Self {
        Self {
            value,
            expires_at: expiration_timestamp(now, ttl_seconds),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry whose deadline equals `now` is expired,
    /// matching the `expiration <= now` predicate used by the sweep.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

// == Utility Functions ==
/// Computes `now + ttl_seconds`, saturating instead of overflowing.
pub fn expiration_timestamp(now: i64, ttl_seconds: u64) -> i64 {
    let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
    now.saturating_add(ttl)
}
