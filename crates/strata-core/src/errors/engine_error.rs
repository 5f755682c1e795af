//! Top-level engine error aggregating all layer errors.

use super::error_code::{self, ErrorCode};
use super::{ConfigError, GitError, ParseError, ResolveError, ScanError, StorageError};

/// Any failure surfaced by pipeline, diff, lineage, or resolver operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl ErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Scan(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Resolve(e) => e.error_code(),
            Self::Git(e) => e.error_code(),
            Self::Cancelled => "CANCELLED",
            Self::Unknown { .. } => error_code::UNKNOWN_ERROR,
        }
    }
}
