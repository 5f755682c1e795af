//! Change-significance scoring for modified record pairs.

use strata_core::types::ModifiedFunction;

use super::similarity::name_similarity;

/// Weighted 0-100 score of how drastic a modification is. Pairs scoring
/// above the configured minimum become `signature-change` candidates with
/// confidence `score / 100`.
pub struct ChangeSignificance {
    signature_weight: f64,
    parameter_weight: f64,
    complexity_weight: f64,
    rename_weight: f64,
}

impl Default for ChangeSignificance {
    fn default() -> Self {
        Self {
            signature_weight: 40.0,
            parameter_weight: 25.0,
            complexity_weight: 25.0,
            rename_weight: 10.0,
        }
    }
}

impl ChangeSignificance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one modified pair.
    pub fn score(&self, pair: &ModifiedFunction) -> f64 {
        let mut score = 0.0;

        if pair.before.signature != pair.after.signature {
            score += self.signature_weight;
        }

        if pair.before.parameters.len() != pair.after.parameters.len() {
            score += self.parameter_weight;
        }

        if let (Some(before), Some(after)) = (&pair.before.metrics, &pair.after.metrics) {
            let delta = before
                .cyclomatic_complexity
                .abs_diff(after.cyclomatic_complexity) as f64;
            // Each point of complexity delta is worth 5, capped at the
            // full weight.
            score += (delta * 5.0).min(self.complexity_weight);
        }

        // Same semantic id implies same role name, but display names can
        // drift when an enclosing scope is renamed.
        let rename_likelihood = 1.0 - name_similarity(&pair.before.name, &pair.after.name);
        score += rename_likelihood * self.rename_weight;

        score.min(100.0)
    }
}
