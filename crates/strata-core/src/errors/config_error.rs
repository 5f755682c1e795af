//! Configuration errors. Always fatal.

use std::path::PathBuf;

use super::error_code::{self, ErrorCode};

/// Missing or invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to parse config {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
