//! One module per table: row structs, prepared statements, mappers.

pub mod call_edges;
pub mod descriptions;
pub mod filter;
pub mod functions;
pub mod lineages;
pub mod snapshots;
pub mod source_files;

use strata_core::errors::StorageError;

/// Shorthand for wrapping rusqlite errors.
pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
