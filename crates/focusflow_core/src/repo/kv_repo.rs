//! Key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Provide the synchronous whole-string read/write primitive the store
//!   persists through.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set` replaces the whole value for a key; there is no partial write.
//! - `get` of a never-written key returns `Ok(None)`, not an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

pub type StorageResult<T> = Result<T, StorageError>;

/// Error for key-value slot reads and writes.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Backend refused the operation (quota, read-only medium, ...).
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistent key-value primitive: synchronous read, synchronous whole-value write.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

/// SQLite-backed key-value slot (`kv_entries` table).
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory key-value slot.
///
/// Clones share the same entries, so a host can keep a handle for inspection
/// after moving one into a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    inner: Rc<RefCell<MemoryEntries>>,
}

#[derive(Debug, Default)]
struct MemoryEntries {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Number of successful `set` calls since creation.
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.value(key))
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}
