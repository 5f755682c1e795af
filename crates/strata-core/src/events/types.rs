//! Event payload types emitted by the pipeline.

use std::path::PathBuf;

/// Emitted when file enumeration begins.
#[derive(Debug, Clone)]
pub struct ScanStartedEvent {
    pub root: PathBuf,
}

/// Emitted periodically while files are read and hashed.
#[derive(Debug, Clone)]
pub struct ScanProgressEvent {
    pub processed: usize,
    pub total: usize,
}

/// Emitted when scanning completes.
#[derive(Debug, Clone)]
pub struct ScanCompleteEvent {
    pub files: usize,
    pub duration_ms: u64,
}

/// Emitted when the per-file analysis phase begins.
#[derive(Debug, Clone)]
pub struct AnalyzeStartedEvent {
    pub total_files: usize,
}

/// Emitted after each analysis batch completes.
#[derive(Debug, Clone)]
pub struct AnalyzeProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub functions_so_far: usize,
}

/// Emitted when a snapshot phase has been persisted.
#[derive(Debug, Clone)]
pub struct SnapshotSavedEvent {
    pub snapshot_id: String,
    pub analysis_level: String,
}

/// Emitted for recoverable per-file failures.
#[derive(Debug, Clone)]
pub struct FileSkippedEvent {
    pub path: PathBuf,
    pub reason: String,
}
