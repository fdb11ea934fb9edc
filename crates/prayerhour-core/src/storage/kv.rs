//! Key-value backends for persisted records.
//!
//! - [`SqliteKv`]: a `kv` table in `prayerhour.db`
//! - [`MemoryKv`]: process-lifetime map, used for tests and as the fallback
//!   when the durable store cannot be written

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::{CoreError, StorageError};

pub trait KvBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed key-value store.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Open the store at `<data dir>/prayerhour.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open_default() -> Result<Self, CoreError> {
        let path = data_dir()?.join("prayerhour.db");
        Ok(Self::open(&path)?)
    }

    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns [`StorageError::OpenFailed`] if SQLite cannot open the file.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let kv = Self { conn };
        kv.migrate()?;
        Ok(kv)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let kv = Self { conn };
        kv.migrate()?;
        Ok(kv)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }
}

impl KvBackend for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
