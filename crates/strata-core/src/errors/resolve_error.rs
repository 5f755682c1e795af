//! Snapshot identifier resolution errors.

use super::error_code::{self, ErrorCode};

/// Errors raised while resolving a user-supplied snapshot identifier.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No snapshot matches '{identifier}'")]
    NotFound { identifier: String },

    #[error("Identifier '{identifier}' is ambiguous; matches: {}", candidates.join(", "))]
    AmbiguousIdentifier {
        identifier: String,
        candidates: Vec<String>,
    },

    #[error("Invalid history offset in '{identifier}'")]
    InvalidOffset { identifier: String },
}

impl ErrorCode for ResolveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::AmbiguousIdentifier { .. } => error_code::AMBIGUOUS_IDENTIFIER,
            Self::InvalidOffset { .. } => error_code::RESOLUTION_ERROR,
        }
    }
}
