//! Per-function quality metrics.

use serde::{Deserialize, Serialize};

/// Scalar quality metrics computed once per function record.
///
/// Invariants: `cyclomatic_complexity >= 1`, `lines_of_code <= total_lines`,
/// all counts non-negative, `maintainability_index` within [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub lines_of_code: u32,
    pub total_lines: u32,
    pub comment_lines: u32,
    pub code_to_comment_ratio: f64,

    pub cyclomatic_complexity: u32,
    pub cognitive_complexity: u32,
    pub max_nesting_level: u32,

    pub parameter_count: u32,
    pub return_statement_count: u32,
    pub branch_count: u32,
    pub loop_count: u32,
    pub try_catch_count: u32,
    pub async_await_count: u32,
    pub callback_count: u32,

    pub halstead_volume: f64,
    pub halstead_difficulty: f64,
    pub maintainability_index: f64,
}

impl Default for QualityMetrics {
    fn default() -> Self {
        Self {
            lines_of_code: 0,
            total_lines: 0,
            comment_lines: 0,
            code_to_comment_ratio: 0.0,
            cyclomatic_complexity: 1,
            cognitive_complexity: 0,
            max_nesting_level: 0,
            parameter_count: 0,
            return_statement_count: 0,
            branch_count: 0,
            loop_count: 0,
            try_catch_count: 0,
            async_await_count: 0,
            callback_count: 0,
            halstead_volume: 0.0,
            halstead_difficulty: 0.0,
            maintainability_index: 100.0,
        }
    }
}

impl QualityMetrics {
    /// Complexity bucket used in snapshot metadata roll-ups.
    pub fn complexity_bucket(&self) -> &'static str {
        match self.cyclomatic_complexity {
            0..=5 => "low",
            6..=10 => "moderate",
            11..=20 => "high",
            _ => "very_high",
        }
    }
}
