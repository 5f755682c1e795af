//! Scanner and parser errors.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Errors that can occur while enumerating and reading source files.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan root does not exist: {root}")]
    RootNotFound { root: PathBuf },

    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    #[error("Walk failed: {message}")]
    WalkFailed { message: String },
}

impl ErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        error_code::SCAN_ERROR
    }
}

/// Per-file parse failures. The file is skipped, a warning is recorded,
/// and the pipeline continues.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unsupported language for extension '{extension}'")]
    UnsupportedLanguage { extension: String },

    #[error("Parser failed on {path}: {message}")]
    SyntaxError { path: PathBuf, message: String },

    #[error("File is not valid UTF-8: {path}")]
    InvalidEncoding { path: PathBuf },
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        error_code::PARSE_ERROR
    }
}
