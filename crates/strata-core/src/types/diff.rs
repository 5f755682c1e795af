//! Snapshot diff results.

use serde::{Deserialize, Serialize};

use super::function::FunctionRecord;
use super::identifiers::SnapshotId;

/// Severity of a single field change, graded against configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeImpact {
    Low,
    Medium,
    High,
}

impl ChangeImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// One per-field change between two paired records.
/// Location-only fields (start/end line) never surface here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeDetail {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub impact: ChangeImpact,
}

/// A record pair with the same semantic id but different content ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedFunction {
    pub before: FunctionRecord,
    pub after: FunctionRecord,
    pub changes: Vec<ChangeDetail>,
}

/// Bucket counts plus numeric roll-ups across all modified pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffStatistics {
    pub added_count: usize,
    pub removed_count: usize,
    pub modified_count: usize,
    pub unchanged_count: usize,
    /// Sum of per-modified cyclomatic deltas.
    pub complexity_delta: i64,
    /// Sum of per-modified lines-of-code deltas.
    pub lines_delta: i64,
}

/// The full result of comparing two snapshots.
///
/// All buckets are emitted sorted by `(file_path, start_line, name)` so
/// equal inputs yield byte-identical output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub from_snapshot: SnapshotId,
    pub to_snapshot: SnapshotId,
    pub added: Vec<FunctionRecord>,
    pub removed: Vec<FunctionRecord>,
    pub modified: Vec<ModifiedFunction>,
    pub unchanged: Vec<FunctionRecord>,
    pub statistics: DiffStatistics,
}

impl SnapshotDiff {
    /// True when nothing was added, removed, or modified.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}
