//! SQLite backend for the Feeder subscriber store.
//!
//! Implements [`feeder_core::persistence::Persistence`] on top of a single
//! key/value table, so the collection survives process restarts.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqlitePersistence;

#[cfg(test)]
mod tests;
