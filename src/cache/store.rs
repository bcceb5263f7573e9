//! Cache Store Module
//!
//! Durable persistence of cache rows. The `Store` trait is the seam the engine
//! is written against; `SqliteStore` is the shipped backend.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::Result;

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS cache (key TEXT UNIQUE, value TEXT, expiration INTEGER)";

// == Store Trait ==
/// A durable key → (encoded value, expiration) table.
///
/// Implementations must make `upsert` a single atomic replace and must treat
/// deleting an absent key as success.
pub trait Store: Send + Sync {
    /// Creates the table if absent. Idempotent.
    fn ensure_schema(&self) -> Result<()>;

    /// Point lookup by key.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts or fully replaces the row for `key`.
    fn upsert(&self, key: &str, value: &str, expires_at: i64) -> Result<()>;

    /// Removes the row for `key` if present.
    fn delete(&self, key: &str) -> Result<()>;

    /// Removes every row with `expiration <= now`, returning how many went.
    fn delete_where_expired(&self, now: i64) -> Result<usize>;

    /// Number of rows physically present, expired or not.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

// == SQLite Store ==
/// SQLite-backed store holding a single connection behind a mutex.
///
/// The mutex guard scopes every statement, so the handle is released on all
/// exit paths and point operations never interleave with the predicate delete.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    // == Constructors ==
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!("Opened cache database at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database. Contents vanish on drop.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Store for SqliteStore {
    fn ensure_schema(&self) -> Result<()> {
        self.conn.lock().execute(CREATE_TABLE, [])?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let conn = self.conn.lock();
        let entry = conn
            .query_row(
                "SELECT value, expiration FROM cache WHERE key = ?1",
                params![key],
                |row| {
                    Ok(CacheEntry {
                        value: row.get(0)?,
                        expires_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn upsert(&self, key: &str, value: &str, expires_at: i64) -> Result<()> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO cache (key, value, expiration) VALUES (?1, ?2, ?3)",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM cache WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn delete_where_expired(&self, now: i64) -> Result<usize> {
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM cache WHERE expiration <= ?1", params![now])?;
        Ok(removed)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
