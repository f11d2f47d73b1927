//! `jokes-store`: namespaced key-value preferences persisted in SQLite.
//!
//! The application needs exactly two durable values: the last joke shown and
//! the remaining countdown. Both go through [`KeyValueStore`] so the scheduler
//! and content cell can be tested against an in-memory database.

pub mod db;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{KeyValueStore, SqliteStore};
