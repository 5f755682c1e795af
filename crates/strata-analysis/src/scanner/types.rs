//! Scanner output types.

use std::path::PathBuf;
use std::time::SystemTime;

use super::language_detect::Language;

/// A candidate file found by the walker, before reading.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_size: u64,
    pub mtime: SystemTime,
    pub language: Language,
}

/// A file read into memory with its stable hash, ready for analysis.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Path relative to the project root, normalized to forward slashes.
    pub relative_path: String,
    pub language: Language,
    pub content: String,
    /// Hex SHA-256 of the UTF-8 bytes.
    pub file_hash: String,
    pub file_size: u64,
    /// Unix milliseconds, when available.
    pub mtime_ms: Option<i64>,
}

impl SourceUnit {
    pub fn line_count(&self) -> u32 {
        self.content.lines().count() as u32
    }
}

/// Timing breakdown for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub discovery_ms: u64,
    pub read_hash_ms: u64,
    pub files_skipped: usize,
}
