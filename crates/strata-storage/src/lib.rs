//! # strata-storage
//!
//! SQLite persistence layer for the Strata engine.
//! WAL mode, write-serialized, transactional snapshot writes,
//! typed queries, schema migrations.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use store::{SnapshotOptions, SnapshotQuery, SnapshotStore};
