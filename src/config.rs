//! Configuration Module
//!
//! Handles loading cache engine configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::ExpirationPolicy;

/// Default TTL applied when `put` receives no (or a zero) TTL.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Default background sweep interval.
pub const DEFAULT_EXPIRATION_INTERVAL_SECS: u64 = 60;

/// Interval used when a zero interval is configured.
pub const FALLBACK_EXPIRATION_INTERVAL_SECS: u64 = 30;

/// Cache engine configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Bypass the engine entirely; no storage is touched
    pub disable: bool,
    /// Background sweep interval in seconds
    pub cache_expiration_interval: u64,
    /// Sweep synchronously before every read instead of on a timer
    pub expire_on_get: bool,
    /// TTL in seconds for entries stored without an explicit TTL
    pub default_ttl: u64,
    /// Location of the SQLite database file
    pub database_path: PathBuf,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DISABLE` - Disable the cache (default: false)
    /// - `CACHE_EXPIRATION_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_EXPIRE_ON_GET` - Sweep before every get (default: false)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_DATABASE_PATH` - SQLite file path (default: cache.db)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            disable: env_flag("CACHE_DISABLE").unwrap_or(defaults.disable),
            cache_expiration_interval: env::var("CACHE_EXPIRATION_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_expiration_interval),
            expire_on_get: env_flag("CACHE_EXPIRE_ON_GET").unwrap_or(defaults.expire_on_get),
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            database_path: env::var("CACHE_DATABASE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
        }
    }

    /// Resolves the expiration policy these options select.
    ///
    /// `disable` wins over everything else; otherwise `expire_on_get` picks
    /// lazy sweeping over the background timer.
    pub fn policy(&self) -> ExpirationPolicy {
        if self.disable {
            ExpirationPolicy::Disabled
        } else if self.expire_on_get {
            ExpirationPolicy::Lazy
        } else {
            let secs = match self.cache_expiration_interval {
                0 => FALLBACK_EXPIRATION_INTERVAL_SECS,
                secs => secs,
            };
            ExpirationPolicy::Background {
                interval: Duration::from_secs(secs),
            }
        }
    }

    /// Default TTL with the zero case folded back to the built-in default.
    pub fn effective_default_ttl(&self) -> u64 {
        match self.default_ttl {
            0 => DEFAULT_TTL_SECS,
            ttl => ttl,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            disable: false,
            cache_expiration_interval: DEFAULT_EXPIRATION_INTERVAL_SECS,
            expire_on_get: false,
            default_ttl: DEFAULT_TTL_SECS,
            database_path: PathBuf::from("cache.db"),
        }
    }
}

/// Parses boolean-ish environment values ("1", "true", "yes", "on").
fn env_flag(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
