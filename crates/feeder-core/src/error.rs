//! Error types for `feeder-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::subscriber::Field;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more required fields were blank after trimming.
  #[error("missing required fields: {}", join_fields(.missing))]
  Validation { missing: Vec<Field> },

  /// Every subscriber number suffix for `date` is already taken.
  #[error("subscriber number space exhausted for {date}")]
  Generation { date: NaiveDate },

  /// The persistence port rejected a write. The in-memory collection still
  /// holds the change.
  #[error("persistence write failed: {0}")]
  PersistenceWrite(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

fn join_fields(fields: &[Field]) -> String {
  fields
    .iter()
    .map(Field::to_string)
    .collect::<Vec<_>>()
    .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
