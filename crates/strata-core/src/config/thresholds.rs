//! Thresholds for change impact and lineage detection.

use serde::{Deserialize, Serialize};

/// Numeric thresholds applied when grading per-field changes in a diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsThresholds {
    /// Cyclomatic delta at or above which a change is `medium` impact.
    pub complexity_medium_delta: u32,
    /// Cyclomatic delta at or above which a change is `high` impact.
    pub complexity_high_delta: u32,
    /// LOC delta at or above which a change is `medium` impact.
    pub lines_medium_delta: u32,
    /// LOC delta at or above which a change is `high` impact.
    pub lines_high_delta: u32,
}

impl Default for MetricsThresholds {
    fn default() -> Self {
        Self {
            complexity_medium_delta: 3,
            complexity_high_delta: 8,
            lines_medium_delta: 20,
            lines_high_delta: 80,
        }
    }
}

/// Tuning for the lineage detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    /// Minimum similarity for a removed→added pairing to become a candidate.
    pub min_similarity: f64,
    /// Minimum change-significance score (0-100) for a modified pair to
    /// become a `signature-change` candidate.
    pub min_significance: f64,
    /// Emit `split` candidates when one removed function correlates with
    /// two or more added functions.
    pub detect_splits: bool,
    /// Per-target similarity floor for split correlation. Lower than
    /// `min_similarity` because each fragment carries only part of the
    /// original implementation.
    pub split_min_similarity: f64,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.7,
            min_significance: 50.0,
            detect_splits: true,
            split_min_similarity: 0.5,
        }
    }
}
