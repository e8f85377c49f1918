//! [`SqlitePersistence`] — the SQLite implementation of [`Persistence`].

use std::path::Path;

use feeder_core::persistence::{Persistence, STORAGE_KEY};
use rusqlite::OptionalExtension as _;

use crate::{Error, Result, schema::SCHEMA};

/// Keeps the serialized subscriber collection in one row of a SQLite file.
pub struct SqlitePersistence {
  conn: rusqlite::Connection,
  key:  String,
}

impl SqlitePersistence {
  /// Open (or create) a database at `path` and run schema initialisation.
  /// Missing parent directories are created.
  pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let conn = rusqlite::Connection::open(path)?;
    let store = Self { conn, key: key.into() };
    store.init_schema()?;
    tracing::debug!(path = %path.display(), key = %store.key, "opened sqlite storage");
    Ok(store)
  }

  /// Open an in-memory database — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let conn = rusqlite::Connection::open_in_memory()?;
    let store = Self { conn, key: STORAGE_KEY.to_owned() };
    store.init_schema()?;
    Ok(store)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  pub fn key(&self) -> &str { &self.key }
}

impl Persistence for SqlitePersistence {
  type Error = Error;

  fn read(&self) -> Result<Option<String>> {
    let value = self
      .conn
      .query_row(
        "SELECT value FROM local_storage WHERE key = ?1",
        [&self.key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  /// A single upsert, so readers see either the old value or the new one.
  fn write(&mut self, snapshot: &str) -> Result<()> {
    self.conn.execute(
      "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value",
      rusqlite::params![self.key, snapshot],
    )?;
    Ok(())
  }
}
