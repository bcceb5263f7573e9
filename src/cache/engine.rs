//! Cache Engine Module
//!
//! Value serialization, TTL computation and expiration-policy orchestration
//! on top of a `Store`.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{
    CacheEntry, CacheStats, Clock, ExpirationPolicy, SqliteStore, Store, SystemClock,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweep_task, SweepTask};

// == Engine Core ==
/// State shared between caller-facing operations and the sweep task.
struct EngineCore {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    default_ttl: u64,
    stats: Mutex<CacheStats>,
}

impl EngineCore {
    fn sweep(&self) -> Result<usize> {
        let removed = self.store.delete_where_expired(self.clock.now())?;
        self.stats.lock().record_sweep(removed);
        Ok(removed)
    }
}

// == Cache Engine ==
/// An expiring key-value cache over a durable store.
///
/// Build one per process and share it through `Arc<CacheEngine>`. The
/// expiration policy is fixed at construction. In background mode the engine
/// owns a sweep task that stops when the engine is shut down or dropped.
pub struct CacheEngine {
    policy: ExpirationPolicy,
    core: Option<Arc<EngineCore>>,
    sweeper: Option<SweepTask>,
}

impl CacheEngine {
    // == Constructors ==
    /// Opens the SQLite database named by `config` and starts the selected
    /// expiration policy.
    ///
    /// A disabled config returns a disabled engine without touching the
    /// filesystem.
    pub fn open(config: &CacheConfig) -> Result<Self> {
        if config.disable {
            return Ok(Self::disabled());
        }
        if config.database_path.as_os_str().is_empty() {
            return Err(CacheError::InvalidConfig(
                "database_path must not be empty".to_string(),
            ));
        }

        let store = SqliteStore::open(&config.database_path)?;
        Self::with_store(config, Arc::new(store), Arc::new(SystemClock))
    }

    /// Builds an engine over an arbitrary store and clock.
    ///
    /// Creates the schema (unless disabled) and, for the background policy,
    /// spawns the sweep task on the current tokio runtime.
    pub fn with_store(
        config: &CacheConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let policy = config.policy();
        if policy == ExpirationPolicy::Disabled {
            return Ok(Self::disabled());
        }

        store.ensure_schema()?;

        let core = Arc::new(EngineCore {
            store,
            clock,
            default_ttl: config.effective_default_ttl(),
            stats: Mutex::new(CacheStats::new()),
        });

        let sweeper = match policy.sweep_interval() {
            Some(interval) => {
                let sweep_core = Arc::clone(&core);
                Some(spawn_sweep_task(move || sweep_core.sweep(), interval)?)
            }
            None => None,
        };

        info!("[CACHE] INITIALIZED ({})", policy);

        Ok(Self {
            policy,
            core: Some(core),
            sweeper,
        })
    }

    /// An engine that stores nothing: `get` misses, `put`/`del` do nothing.
    pub fn disabled() -> Self {
        info!("[CACHE] DISABLED");
        Self {
            policy: ExpirationPolicy::Disabled,
            core: None,
            sweeper: None,
        }
    }

    // == Get ==
    /// Retrieves the live value stored under `key`.
    ///
    /// Returns `Ok(None)` for missing and expired keys alike. A stored value
    /// that fails to decode is reported as `CorruptEntry`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.get_as(key)
    }

    /// Like `get`, decoding straight into `T`.
    ///
    /// A stored value that does not fit `T` is also `CorruptEntry`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(core) = &self.core else {
            return Ok(None);
        };

        if self.policy.sweeps_on_get() {
            let removed = core.sweep()?;
            debug!("[CACHE] EXPIRE_ON_GET removed [{}] object(s)", removed);
        }

        let now = core.clock.now();
        match core.store.get(key)? {
            Some(entry) if !entry.is_expired_at(now) => {
                let value = serde_json::from_str(&entry.value).map_err(|source| {
                    CacheError::CorruptEntry {
                        key: key.to_string(),
                        source,
                    }
                })?;
                core.stats.lock().record_hit();
                debug!("[CACHE] HIT, key[{}]", key);
                Ok(Some(value))
            }
            _ => {
                core.stats.lock().record_miss();
                debug!("[CACHE] MISS, key[{}]", key);
                Ok(None)
            }
        }
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// `ttl_seconds` of `None` or `Some(0)` uses the configured default. The
    /// value is encoded before storage is touched, so an encoding failure
    /// leaves the store unchanged.
    pub fn put<V>(&self, key: &str, value: &V, ttl_seconds: Option<u64>) -> Result<()>
    where
        V: Serialize + ?Sized,
    {
        let Some(core) = &self.core else {
            return Ok(());
        };

        let encoded = serde_json::to_string(value).map_err(CacheError::Serialization)?;
        let ttl = match ttl_seconds {
            Some(ttl) if ttl > 0 => ttl,
            _ => core.default_ttl,
        };

        let now = core.clock.now();
        let entry = CacheEntry::new(encoded, now, ttl);
        core.store.upsert(key, &entry.value, entry.expires_at)?;
        core.stats.lock().record_put();

        debug!(
            "[CACHE] PUT: key[{}], time={}, expires_at={}",
            key, now, entry.expires_at
        );
        Ok(())
    }

    // == Delete ==
    /// Removes `key`. Succeeds whether or not it was present.
    pub fn del(&self, key: &str) -> Result<()> {
        let Some(core) = &self.core else {
            return Ok(());
        };

        core.store.delete(key)?;
        core.stats.lock().record_delete();
        debug!("[CACHE] DELETED key[{}]", key);
        Ok(())
    }

    // == Sweep ==
    /// Runs one expiration pass now and returns how many rows it removed.
    pub fn sweep(&self) -> Result<usize> {
        match &self.core {
            Some(core) => core.sweep(),
            None => Ok(0),
        }
    }

    // == Introspection ==
    pub fn policy(&self) -> ExpirationPolicy {
        self.policy
    }

    pub fn is_enabled(&self) -> bool {
        self.core.is_some()
    }

    /// Returns a snapshot of the engine's counters.
    pub fn stats(&self) -> CacheStats {
        self.core
            .as_ref()
            .map(|core| core.stats.lock().clone())
            .unwrap_or_default()
    }

    /// Number of rows physically stored, including expired rows not yet swept.
    pub fn len(&self) -> Result<usize> {
        match &self.core {
            Some(core) => core.store.len(),
            None => Ok(0),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // == Shutdown ==
    /// Stops the background sweep, if any, and releases the store.
    pub fn shutdown(mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop();
            info!("[CACHE] Expiration sweep stopped");
        }
    }
}

impl fmt::Debug for CacheEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEngine")
            .field("policy", &self.policy)
            .field("enabled", &self.is_enabled())
            .field(
                "sweep_interval",
                &self.sweeper.as_ref().map(SweepTask::interval),
            )
            .finish()
    }
}
