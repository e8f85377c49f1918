//! The persistence port and the snapshot codec.
//!
//! The whole collection is stored as one JSON array under a single fixed
//! key. Backends only move that string around; parsing and the
//! degrade-to-empty policy live here so every backend behaves the same.

use std::convert::Infallible;

use crate::{Result, subscriber::SubscriberRecord};

/// Key under which the serialized collection is stored.
pub const STORAGE_KEY: &str = "power-subscribers-v1";

/// Storage for the serialized subscriber collection.
///
/// `write` replaces the stored value wholesale; a reader must observe either
/// the previous value or the new one, never a mix.
pub trait Persistence {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The stored value, or `None` if nothing has been written yet.
  fn read(&self) -> Result<Option<String>, Self::Error>;

  fn write(&mut self, snapshot: &str) -> Result<(), Self::Error>;
}

// ─── Codec ───────────────────────────────────────────────────────────────────

pub fn encode_snapshot(records: &[SubscriberRecord]) -> Result<String> {
  Ok(serde_json::to_string(records)?)
}

/// Parse a stored snapshot.
///
/// Absent, `null`, malformed, or wrongly shaped data all yield an empty
/// collection. This is the only place a parse failure is swallowed.
pub fn decode_snapshot(raw: Option<&str>) -> Vec<SubscriberRecord> {
  let Some(raw) = raw else {
    return Vec::new();
  };

  match serde_json::from_str::<Option<Vec<SubscriberRecord>>>(raw) {
    Ok(records) => records.unwrap_or_default(),
    Err(e) => {
      tracing::warn!(error = %e, "stored subscriber data is unreadable; starting empty");
      Vec::new()
    }
  }
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A [`Persistence`] that keeps the snapshot in memory — useful for testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
  value:  Option<String>,
  writes: usize,
}

impl MemoryPersistence {
  pub fn new() -> Self { Self::default() }

  /// Start with `raw` already stored, as if written by an earlier run.
  pub fn with_value(raw: impl Into<String>) -> Self {
    Self { value: Some(raw.into()), writes: 0 }
  }

  pub fn value(&self) -> Option<&str> { self.value.as_deref() }

  /// Number of successful writes so far.
  pub fn writes(&self) -> usize { self.writes }
}

impl Persistence for MemoryPersistence {
  type Error = Infallible;

  fn read(&self) -> Result<Option<String>, Infallible> { Ok(self.value.clone()) }

  fn write(&mut self, snapshot: &str) -> Result<(), Infallible> {
    self.value = Some(snapshot.to_owned());
    self.writes += 1;
    Ok(())
  }
}
