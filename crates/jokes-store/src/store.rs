use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::db::init_db;
use crate::error::{Result, StoreError};

/// Flat string key-value store scoped to one application namespace.
///
/// Implementations must be cheap to share behind an `Arc`; both the
/// scheduler and the content cell hold one.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read an integer stored as decimal text.
    ///
    /// Returns `Corrupt` when the value exists but does not parse as `u64`
    /// (negative numbers included).
    fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        match self.get(key)? {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| StoreError::Corrupt {
                    key: key.to_string(),
                    value: raw,
                }),
        }
    }

    fn set_u64(&self, key: &str, value: u64) -> Result<()> {
        self.set(key, &value.to_string())
    }
}

/// SQLite-backed [`KeyValueStore`].
///
/// All keys live in the shared `preferences` table, partitioned by
/// `namespace` so several applications can share one database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    namespace: String,
}

impl SqliteStore {
    /// Wrap an open connection, creating the schema if needed.
    pub fn new(conn: Connection, namespace: impl Into<String>) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            namespace: namespace.into(),
        })
    }

    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::new(conn, namespace)
    }

    /// Throwaway store for tests and dry runs.
    pub fn open_in_memory(namespace: impl Into<String>) -> Result<Self> {
        Self::new(Connection::open_in_memory()?, namespace)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE namespace = ?1 AND key = ?2",
                rusqlite::params![self.namespace, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO preferences (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            rusqlite::params![self.namespace, key, value, now],
        )?;
        debug!(namespace = %self.namespace, key, "preference written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_key_is_none() {
        let store = SqliteStore::open_in_memory("test").unwrap();
        assert_eq!(store.get("JOKE").unwrap(), None);
    }

    #[test]
    fn set_then_get_overwrites() {
        let store = SqliteStore::open_in_memory("test").unwrap();
        store.set("JOKE", "first").unwrap();
        store.set("JOKE", "second").unwrap();
        assert_eq!(store.get("JOKE").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn namespaces_are_isolated() {
        let conn = Connection::open_in_memory().unwrap();
        let a = SqliteStore::new(conn, "a").unwrap();
        a.set("TIMER", "10").unwrap();
        // same connection, different namespace
        let conn = a.conn.into_inner().unwrap();
        let b = SqliteStore::new(conn, "b").unwrap();
        assert_eq!(b.get("TIMER").unwrap(), None);
    }

    #[test]
    fn u64_helpers() {
        let store = SqliteStore::open_in_memory("test").unwrap();
        assert_eq!(store.get_u64("TIMER").unwrap(), None);
        store.set_u64("TIMER", 1200).unwrap();
        assert_eq!(store.get_u64("TIMER").unwrap(), Some(1200));
    }

    #[test]
    fn u64_rejects_negative_and_garbage() {
        let store = SqliteStore::open_in_memory("test").unwrap();
        store.set("TIMER", "-5").unwrap();
        assert!(matches!(
            store.get_u64("TIMER"),
            Err(StoreError::Corrupt { .. })
        ));
        store.set("TIMER", "soon").unwrap();
        assert!(matches!(
            store.get_u64("TIMER"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokes.db");
        {
            let store = SqliteStore::open(&path, "app_preferences").unwrap();
            store.set("JOKE_KEY_PREFS", "persisted").unwrap();
        }
        let store = SqliteStore::open(&path, "app_preferences").unwrap();
        assert_eq!(
            store.get("JOKE_KEY_PREFS").unwrap().as_deref(),
            Some("persisted")
        );
    }
}
