//! Per-snapshot source-file blobs.

use serde::{Deserialize, Serialize};

/// The full content of one analyzed file, owned by a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFileRecord {
    pub id: String,
    pub file_path: String,
    pub content: String,
    /// Hex SHA-256 of the UTF-8 bytes.
    pub file_hash: String,
    pub encoding: String,
    pub file_size_bytes: u64,
    pub line_count: u32,
    pub language: String,
    pub function_count: u32,
    pub export_count: u32,
    pub import_count: u32,
    /// Unix milliseconds, when available from the filesystem.
    pub file_modified_time: Option<i64>,
}
