//! Event handler trait with no-op defaults.

use super::types::*;

/// Callback surface for pipeline progress. All methods default to no-ops so
/// consumers implement only what they render.
pub trait StrataEventHandler: Send + Sync {
    fn on_scan_started(&self, _event: &ScanStartedEvent) {}
    fn on_scan_progress(&self, _event: &ScanProgressEvent) {}
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {}
    fn on_analyze_started(&self, _event: &AnalyzeStartedEvent) {}
    fn on_analyze_progress(&self, _event: &AnalyzeProgressEvent) {}
    fn on_snapshot_saved(&self, _event: &SnapshotSavedEvent) {}
    fn on_file_skipped(&self, _event: &FileSkippedEvent) {}
}

/// Handler that ignores every event. Used by tests and embedding callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventHandler;

impl StrataEventHandler for NullEventHandler {}
