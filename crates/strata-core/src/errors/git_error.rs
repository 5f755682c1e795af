//! Git integration errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors from Git repository introspection and worktree management.
/// Worktree cleanup is best-effort on all paths.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Unknown git revision: {rev}")]
    UnknownRevision { rev: String },

    #[error("Worktree operation failed at {path}: {message}")]
    WorktreeFailed { path: PathBuf, message: String },

    #[error("Git operation failed: {message}")]
    OperationFailed { message: String },
}

impl ErrorCode for GitError {
    fn error_code(&self) -> &'static str {
        error_code::GIT_ERROR
    }
}
