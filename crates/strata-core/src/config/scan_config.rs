//! Scanner configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the file scanner subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    /// Root directories to scan, relative to the project root.
    /// Empty means the project root itself.
    pub roots: Vec<String>,
    /// Exclude patterns. Patterns without glob metacharacters are treated
    /// as directory segments (`**/name/**`).
    pub exclude: Vec<String>,
    /// Also scan JavaScript extensions (.js/.jsx/.mts/.cts). Default: false.
    pub include_javascript: Option<bool>,
    /// Maximum file size in bytes. Default: 1MB (1_048_576).
    pub max_file_size: Option<u64>,
    /// Number of walker threads. 0 = auto-detect.
    pub threads: Option<usize>,
    /// Files analyzed in parallel per batch. Default: 50.
    pub batch_size: Option<usize>,
    /// Quick mode: cap total files analyzed, sampling evenly. Default: off.
    pub quick_max_files: Option<usize>,
    /// Follow symbolic links. Default: false.
    pub follow_symlinks: Option<bool>,
}

impl ScanConfig {
    /// Returns the effective max file size, defaulting to 1MB.
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(1_048_576)
    }

    /// Returns the effective walker thread count, defaulting to 0 (auto).
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    /// Returns the effective analysis batch size, defaulting to 50.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(50)
    }

    /// Returns whether JavaScript extensions are scanned, defaulting to false.
    pub fn effective_include_javascript(&self) -> bool {
        self.include_javascript.unwrap_or(false)
    }
}
