//! Key-value store.
//!
//! Durable mapping from string keys to JSON-serialized values. Reads that
//! fail resolve to `None`; writes that fail are logged and swallowed so a
//! storage problem never reaches the caller.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use rusqlite::OptionalExtension;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use dreamweaver_core::error::{DreamweaverError, Result};

use crate::db::Database;

/// Type-safe key: binds a storage name to the type stored under it.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> std::fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// A durable medium holding raw serialized text per key.
pub trait KvBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;

    fn delete(&self, key: &str) -> Result<()>;

    /// Remove every key in the medium.
    fn clear(&self) -> Result<()>;
}

/// SQLite-backed medium, one row per key.
pub struct SqliteBackend {
    db: Arc<Database>,
}

impl SqliteBackend {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl KvBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DreamweaverError::Storage(format!("Failed to read {}: {}", key, e)))
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value],
            )
            .map_err(|e| DreamweaverError::Storage(format!("Failed to write {}: {}", key, e)))?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", rusqlite::params![key])
                .map_err(|e| DreamweaverError::Storage(format!("Failed to delete {}: {}", key, e)))?;
            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store", [])
                .map_err(|e| DreamweaverError::Storage(format!("Failed to clear store: {}", e)))?;
            Ok(())
        })
    }
}

/// Process-local medium. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| DreamweaverError::Storage(format!("Memory store lock poisoned: {}", e)))
    }
}

impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

/// Handle to the key-value store shared by every repository.
///
/// Cloning is cheap; clones share the same medium. A store built with
/// [`KvStore::unavailable`] has no medium: reads return `None` and writes do
/// nothing.
#[derive(Clone)]
pub struct KvStore {
    backend: Option<Arc<dyn KvBackend>>,
}

impl KvStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn sqlite(db: Arc<Database>) -> Self {
        Self::new(Arc::new(SqliteBackend::new(db)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// A store for contexts without a durable medium.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Read and deserialize the value under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: Key<T>) -> Option<T> {
        self.get_raw(key.name())
    }

    /// Serialize and store `value` under `key`.
    pub fn set<T: Serialize>(&self, key: Key<T>, value: &T) {
        self.set_raw(key.name(), value);
    }

    pub fn remove<T>(&self, key: Key<T>) {
        self.remove_raw(key.name());
    }

    /// Read an arbitrary JSON value.
    pub fn get_value(&self, key: &str) -> Option<serde_json::Value> {
        self.get_raw(key)
    }

    /// Store an arbitrary JSON value.
    pub fn set_value(&self, key: &str, value: &serde_json::Value) {
        self.set_raw(key, value);
    }

    pub fn remove_raw(&self, key: &str) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = backend.delete(key) {
            error!(key = %key, backend = backend.name(), error = %e, "Failed to remove key");
        }
    }

    /// Remove every key from the medium.
    pub fn clear(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        match backend.clear() {
            Ok(()) => debug!(backend = backend.name(), "Store cleared"),
            Err(e) => error!(backend = backend.name(), error = %e, "Failed to clear store"),
        }
    }

    fn get_raw<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;
        let text = match backend.read(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                error!(key = %key, backend = backend.name(), error = %e, "Failed to read key");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(key = %key, error = %e, "Stored value is unreadable, treating as absent");
                None
            }
        }
    }

    fn set_raw<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(backend) = &self.backend else {
            return;
        };
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to serialize value");
                return;
            }
        };
        if let Err(e) = backend.write(key, &text) {
            error!(key = %key, backend = backend.name(), error = %e, "Failed to write key");
        }
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .finish()
    }
}
