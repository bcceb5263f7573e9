//! Cache Statistics Module
//!
//! Tracks hits, misses, writes and sweep activity.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity since the engine was built.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of lookups that found nothing live
    pub misses: u64,
    /// Number of `put` calls that reached the store
    pub puts: u64,
    /// Number of `del` calls that reached the store
    pub deletes: u64,
    /// Number of completed sweeps (background, lazy or manual)
    pub sweeps: u64,
    /// Total rows removed by sweeps
    pub expired: u64,
    /// When the last sweep finished
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    // == Record Sweep ==
    /// Counts a finished sweep and the rows it removed.
    pub fn record_sweep(&mut self, removed: usize) {
        self.sweeps += 1;
        self.expired += removed as u64;
        self.last_sweep_at = Some(Utc::now());
    }
}
