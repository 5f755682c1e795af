//! Storage-layer errors for SQLite operations.

use super::error_code::{self, ErrorCode};

/// Errors that can occur in the storage layer.
///
/// Writes are transactional: a `WriteFailed` never leaves partial
/// snapshot state behind.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Snapshot write failed: {message}")]
    WriteFailed { message: String },

    #[error("Snapshot read failed: {message}")]
    ReadFailed { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Snapshot not found: {identifier}")]
    SnapshotNotFound { identifier: String },

    #[error("Function not found: {id}")]
    FunctionNotFound { id: String },
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WriteFailed { .. } => error_code::STORAGE_WRITE_ERROR,
            Self::ReadFailed { .. } => error_code::STORAGE_READ_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::SnapshotNotFound { .. } | Self::FunctionNotFound { .. } => {
                error_code::NOT_FOUND
            }
            _ => error_code::STORAGE_ERROR,
        }
    }
}
