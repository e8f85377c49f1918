//! Core types and the subscriber store for Feeder.
//!
//! This crate is deliberately free of database and terminal dependencies.
//! Storage backends implement [`persistence::Persistence`]; presentation
//! layers drive [`store::SubscriberStore`].

pub mod clock;
pub mod error;
pub mod identifier;
pub mod persistence;
pub mod store;
pub mod subscriber;

pub use error::{Error, Result};
pub use store::SubscriberStore;
