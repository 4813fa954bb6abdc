//! Persistent store on SQLite, for cached state that outlives the process.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::key::CacheKey;

use super::{CacheStore, WriteOp, WriteOptions};

/// SQLite-backed cache store.
///
/// Rows are keyed by the SHA-256 of the canonical key form, with the
/// canonical form kept alongside for inspection. Values are stored as JSON
/// blobs. There is no notification side here: this backend suits cold-start
/// reuse of previously fetched state, not live subscriptions.
pub struct SqliteStore<V> {
  conn: Mutex<Connection>,
  _value: PhantomData<fn() -> V>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entry_cache (
    key_hash TEXT PRIMARY KEY,
    key_canon TEXT NOT NULL,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl<V> SqliteStore<V> {
  /// Open (or create) a store at `path`, creating parent directories as
  /// needed.
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| StoreError::message(format!("failed to create cache directory: {}", e)))?;
    }
    let conn = Connection::open(path).map_err(|e| {
      StoreError::message(format!("failed to open cache database at {}: {}", path.display(), e))
    })?;
    Self::from_connection(conn)
  }

  /// Open the store at the platform data directory for `app`.
  pub fn open_default(app: &str) -> Result<Self, StoreError> {
    Self::open(&Self::default_path(app)?)
  }

  /// Fully in-memory database, for tests and throwaway sessions.
  pub fn in_memory() -> Result<Self, StoreError> {
    let conn = Connection::open_in_memory()
      .map_err(|e| StoreError::message(format!("failed to open in-memory database: {}", e)))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self, StoreError> {
    let store = Self {
      conn: Mutex::new(conn),
      _value: PhantomData,
    };
    store.run_migrations()?;
    Ok(store)
  }

  fn default_path(app: &str) -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
      .ok_or_else(|| StoreError::message("could not determine a data directory"))?;
    Ok(data_dir.join(app).join("cache.db"))
  }

  fn run_migrations(&self) -> Result<(), StoreError> {
    let conn = self.lock()?;
    conn
      .execute_batch(SCHEMA)
      .map_err(|e| StoreError::message(format!("failed to run cache migrations: {}", e)))?;
    Ok(())
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    self
      .conn
      .lock()
      .map_err(|e| StoreError::message(format!("lock poisoned: {}", e)))
  }
}

impl<V: Serialize + DeserializeOwned> SqliteStore<V> {
  fn read_row(&self, conn: &Connection, key_hash: &str) -> Result<Option<V>, StoreError> {
    let mut stmt = conn
      .prepare("SELECT data FROM entry_cache WHERE key_hash = ?")
      .map_err(|e| StoreError::message(format!("failed to prepare cache read: {}", e)))?;
    let row: Option<Vec<u8>> = stmt
      .query_row(params![key_hash], |row| row.get(0))
      .optional()
      .map_err(|e| StoreError::message(format!("failed to read cache entry: {}", e)))?;
    match row {
      Some(data) => {
        let value = serde_json::from_slice(&data)
          .map_err(|e| StoreError::message(format!("failed to decode cache entry: {}", e)))?;
        Ok(Some(value))
      }
      None => Ok(None),
    }
  }

  fn write_row(&self, conn: &Connection, key: &CacheKey, value: &V) -> Result<(), StoreError> {
    let data = serde_json::to_vec(value)
      .map_err(|e| StoreError::message(format!("failed to encode cache entry: {}", e)))?;
    conn
      .execute(
        "INSERT OR REPLACE INTO entry_cache (key_hash, key_canon, data, cached_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![key.storage_hash(), key.canon(), data],
      )
      .map_err(|e| StoreError::message(format!("failed to store cache entry: {}", e)))?;
    Ok(())
  }

  /// When the entry at `key` was last written, if it exists.
  pub fn cached_at(&self, key: &CacheKey) -> Result<Option<DateTime<Utc>>, StoreError> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT cached_at FROM entry_cache WHERE key_hash = ?")
      .map_err(|e| StoreError::message(format!("failed to prepare cache read: {}", e)))?;
    let row: Option<String> = stmt
      .query_row(params![key.storage_hash()], |row| row.get(0))
      .optional()
      .map_err(|e| StoreError::message(format!("failed to read cache entry: {}", e)))?;
    row.map(|raw| parse_datetime(&raw)).transpose()
  }
}

#[async_trait]
impl<V> CacheStore<V> for SqliteStore<V>
where
  V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
  fn name(&self) -> &'static str {
    "sqlite"
  }

  async fn read(&self, key: &CacheKey) -> Result<Option<V>, StoreError> {
    let conn = self.lock()?;
    self.read_row(&conn, &key.storage_hash())
  }

  async fn write(
    &self,
    key: &CacheKey,
    op: WriteOp<V>,
    _opts: WriteOptions,
  ) -> Result<(), StoreError> {
    let conn = self.lock()?;
    match op {
      WriteOp::Set(value) => self.write_row(&conn, key, &value),
      WriteOp::Update(f) => {
        // Read-modify-write stays under the connection lock, so updaters
        // are atomic per key.
        let previous = self.read_row(&conn, &key.storage_hash())?;
        match f(previous) {
          Some(next) => self.write_row(&conn, key, &next),
          None => Ok(()),
        }
      }
    }
  }
}

/// Parse a datetime in SQLite's `datetime('now')` format.
fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, StoreError> {
  chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| StoreError::message(format!("failed to parse datetime '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{json, Value};

  fn store() -> SqliteStore<Value> {
    SqliteStore::in_memory().unwrap()
  }

  fn key(id: &str) -> CacheKey {
    CacheKey::resource("things", id)
  }

  #[tokio::test]
  async fn test_set_then_read_roundtrips_json() {
    let store = store();
    let value = json!({"id": "1", "tags": ["a", "b"]});
    store.write(&key("1"), WriteOp::Set(value.clone()), WriteOptions::no_refetch()).await.unwrap();
    assert_eq!(store.read(&key("1")).await.unwrap(), Some(value));
    assert_eq!(store.read(&key("2")).await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_set_replaces_the_previous_value() {
    let store = store();
    store.write(&key("1"), WriteOp::Set(json!(1)), WriteOptions::no_refetch()).await.unwrap();
    store.write(&key("1"), WriteOp::Set(json!(2)), WriteOptions::no_refetch()).await.unwrap();
    assert_eq!(store.read(&key("1")).await.unwrap(), Some(json!(2)));
  }

  #[tokio::test]
  async fn test_update_applies_over_the_previous_value() {
    let store = store();
    store.write(&key("1"), WriteOp::Set(json!([1])), WriteOptions::no_refetch()).await.unwrap();
    store
      .write(
        &key("1"),
        WriteOp::update(|prev: Option<Value>| {
          prev.map(|value| {
            let mut items = value.as_array().cloned().unwrap_or_default();
            items.push(json!(2));
            Value::Array(items)
          })
        }),
        WriteOptions::no_refetch(),
      )
      .await
      .unwrap();
    assert_eq!(store.read(&key("1")).await.unwrap(), Some(json!([1, 2])));
  }

  #[tokio::test]
  async fn test_update_over_an_absent_entry_writes_nothing() {
    let store = store();
    store
      .write(&key("1"), WriteOp::update(|prev| prev), WriteOptions::no_refetch())
      .await
      .unwrap();
    assert_eq!(store.read(&key("1")).await.unwrap(), None);
    assert_eq!(store.cached_at(&key("1")).unwrap(), None);
  }

  #[tokio::test]
  async fn test_cached_at_reflects_writes() {
    let store = store();
    assert_eq!(store.cached_at(&key("1")).unwrap(), None);
    store.write(&key("1"), WriteOp::Set(json!(1)), WriteOptions::no_refetch()).await.unwrap();
    assert!(store.cached_at(&key("1")).unwrap().is_some());
  }
}
