//! Pluggable similarity detectors. Each returns a score in [0, 1] for a
//! (disappeared, appeared) record pair; the service combines them.

use strata_core::types::collections::FxHashSet;
use strata_core::types::FunctionRecord;

/// One similarity signal between two function records.
pub trait SimilarityDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn similarity(&self, removed: &FunctionRecord, candidate: &FunctionRecord) -> f64;
}

/// Exact implementation match via content id / AST hash.
pub struct ContentMatchDetector;

impl SimilarityDetector for ContentMatchDetector {
    fn name(&self) -> &'static str {
        "content-match"
    }

    fn similarity(&self, removed: &FunctionRecord, candidate: &FunctionRecord) -> f64 {
        if removed.content_id == candidate.content_id || removed.ast_hash == candidate.ast_hash {
            1.0
        } else {
            0.0
        }
    }
}

/// Normalized Levenshtein similarity over function names.
pub struct NameSimilarityDetector;

impl SimilarityDetector for NameSimilarityDetector {
    fn name(&self) -> &'static str {
        "name-similarity"
    }

    fn similarity(&self, removed: &FunctionRecord, candidate: &FunctionRecord) -> f64 {
        name_similarity(&removed.name, &candidate.name)
    }
}

/// Parameter-shape and return-type agreement.
pub struct SignatureSimilarityDetector;

impl SimilarityDetector for SignatureSimilarityDetector {
    fn name(&self) -> &'static str {
        "signature-similarity"
    }

    fn similarity(&self, removed: &FunctionRecord, candidate: &FunctionRecord) -> f64 {
        let a = &removed.parameters;
        let b = &candidate.parameters;
        let max_len = a.len().max(b.len());

        let arity_score = if max_len == 0 {
            1.0
        } else {
            1.0 - (a.len().abs_diff(b.len()) as f64 / max_len as f64)
        };

        let matching_types = a
            .iter()
            .zip(b.iter())
            .filter(|(x, y)| x.type_simple == y.type_simple)
            .count();
        let type_score = if max_len == 0 {
            1.0
        } else {
            matching_types as f64 / max_len as f64
        };

        let return_score = if removed.return_type == candidate.return_type {
            1.0
        } else {
            0.0
        };

        0.4 * arity_score + 0.4 * type_score + 0.2 * return_score
    }
}

/// How much of the candidate's implementation is drawn from the removed
/// function: token containment, not Jaccard, so fragments of a split
/// score high against the original.
pub struct SourceContainmentDetector;

impl SimilarityDetector for SourceContainmentDetector {
    fn name(&self) -> &'static str {
        "source-containment"
    }

    fn similarity(&self, removed: &FunctionRecord, candidate: &FunctionRecord) -> f64 {
        let original = token_set(removed.source_code.as_deref().unwrap_or(""));
        let fragment = token_set(candidate.source_code.as_deref().unwrap_or(""));
        if fragment.is_empty() {
            return 0.0;
        }
        let shared = fragment.intersection(&original).count();
        shared as f64 / fragment.len() as f64
    }
}

/// Weighted combination of all detectors.
///
/// An exact content match dominates: a verbatim body under a new name is
/// the canonical rename and must score above any heuristic pairing.
pub struct SimilarityService {
    detectors: Vec<Box<dyn SimilarityDetector>>,
}

impl SimilarityService {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(ContentMatchDetector),
                Box::new(SourceContainmentDetector),
                Box::new(SignatureSimilarityDetector),
                Box::new(NameSimilarityDetector),
            ],
        }
    }

    /// Register an additional detector.
    pub fn register(&mut self, detector: Box<dyn SimilarityDetector>) {
        self.detectors.push(detector);
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Combined similarity in [0, 1].
    pub fn score(&self, removed: &FunctionRecord, candidate: &FunctionRecord) -> f64 {
        let mut by_name: Vec<(&'static str, f64)> = Vec::with_capacity(self.detectors.len());
        for detector in &self.detectors {
            by_name.push((detector.name(), detector.similarity(removed, candidate)));
        }

        let get = |name: &str| {
            by_name
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, s)| *s)
                .unwrap_or(0.0)
        };

        let content = get("content-match");
        if content >= 1.0 {
            let name_bonus = 0.05 * get("name-similarity");
            return (0.95 + name_bonus).min(1.0);
        }

        let weighted = 0.45 * get("source-containment")
            + 0.30 * get("signature-similarity")
            + 0.25 * get("name-similarity");

        // Extra registered detectors contribute the average of their
        // scores at a fixed 10% blend.
        let extras: Vec<f64> = by_name
            .iter()
            .filter(|(n, _)| {
                !matches!(
                    *n,
                    "content-match"
                        | "source-containment"
                        | "signature-similarity"
                        | "name-similarity"
                )
            })
            .map(|(_, s)| *s)
            .collect();
        if extras.is_empty() {
            weighted
        } else {
            let extra_avg = extras.iter().sum::<f64>() / extras.len() as f64;
            (0.9 * weighted + 0.1 * extra_avg).min(1.0)
        }
    }
}

impl Default for SimilarityService {
    fn default() -> Self {
        Self::new()
    }
}

fn token_set(source: &str) -> FxHashSet<String> {
    source
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.len() > 1)
        .map(str::to_string)
        .collect()
}

/// Normalized Levenshtein similarity.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_one() {
        assert_eq!(name_similarity("validate", "validate"), 1.0);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("sitting", "kitten"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(name_similarity("validate", "zzz") < 0.3);
    }
}
