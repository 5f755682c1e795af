//! Immutable snapshot headers and rolled-up metadata.

use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;
use super::identifiers::SnapshotId;

/// How far the analysis of a snapshot has progressed.
/// Promoted after each pipeline phase, never demoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisLevel {
    None,
    Basic,
    CallGraph,
}

impl AnalysisLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::CallGraph => "call-graph",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "basic" => Some(Self::Basic),
            "call-graph" => Some(Self::CallGraph),
            _ => None,
        }
    }
}

/// Function counts per cyclomatic-complexity bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityDistribution {
    /// CC 1-5.
    pub low: u32,
    /// CC 6-10.
    pub moderate: u32,
    /// CC 11-20.
    pub high: u32,
    /// CC above 20.
    pub very_high: u32,
}

impl ComplexityDistribution {
    /// Add one function with the given bucket name.
    pub fn record(&mut self, bucket: &str) {
        match bucket {
            "low" => self.low += 1,
            "moderate" => self.moderate += 1,
            "high" => self.high += 1,
            _ => self.very_high += 1,
        }
    }
}

/// Aggregates recomputed from persisted rows after each write phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotMetadata {
    pub total_functions: u32,
    pub total_files: u32,
    pub avg_complexity: f64,
    pub max_complexity: u32,
    pub exported_functions: u32,
    pub async_functions: u32,
    pub complexity_distribution: ComplexityDistribution,
    /// Counts per file extension, e.g. `ts` → 42.
    pub file_extensions: FxHashMap<String, u32>,
    pub analysis_level: Option<AnalysisLevel>,
    pub basic_analysis_completed: bool,
    pub call_graph_analysis_completed: bool,
}

/// A versioned, immutable container of analysis results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    /// Unix milliseconds.
    pub created_at: i64,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub git_tag: Option<String>,
    pub project_root: String,
    pub config_hash: String,
    pub scope: String,
    pub metadata: SnapshotMetadata,
}

impl Snapshot {
    /// The effective analysis level, defaulting to `none` for a fresh header.
    pub fn analysis_level(&self) -> AnalysisLevel {
        self.metadata.analysis_level.unwrap_or(AnalysisLevel::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AnalysisLevel::None < AnalysisLevel::Basic);
        assert!(AnalysisLevel::Basic < AnalysisLevel::CallGraph);
    }

    #[test]
    fn distribution_buckets() {
        let mut dist = ComplexityDistribution::default();
        dist.record("low");
        dist.record("moderate");
        dist.record("very_high");
        assert_eq!(dist.low, 1);
        assert_eq!(dist.moderate, 1);
        assert_eq!(dist.very_high, 1);
    }
}
