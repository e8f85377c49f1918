//! SQL schema for the Feeder SQLite backend.
//!
//! The database mirrors a browser-style local storage area: one row per key,
//! the value an opaque string. Feeder uses a single key.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS local_storage (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL      -- serialized subscriber array
);

PRAGMA user_version = 1;
";
