//! Lineage detection: propose rename / signature-change / inline / split
//! relations between disappeared and appeared functions.

pub mod significance;
pub mod similarity;

use strata_core::config::LineageConfig;
use strata_core::errors::EngineError;
use strata_core::types::collections::{FxHashMap, FxHashSet};
use strata_core::types::{
    FunctionRecord, Lineage, LineageKind, LineageStatus, PhysicalId, SnapshotDiff,
};
use strata_storage::SnapshotStore;
use uuid::Uuid;

use significance::ChangeSignificance;
use similarity::SimilarityService;

/// A proposed lineage, before persistence.
#[derive(Debug, Clone)]
pub struct LineageCandidate {
    pub from_ids: Vec<PhysicalId>,
    pub to_ids: Vec<PhysicalId>,
    pub kind: LineageKind,
    pub confidence: f64,
    pub note: String,
}

/// Detects lineage candidates over a snapshot diff.
pub struct LineageDetector {
    config: LineageConfig,
    similarity: SimilarityService,
    significance: ChangeSignificance,
}

impl LineageDetector {
    pub fn new(config: LineageConfig) -> Self {
        Self {
            config,
            similarity: SimilarityService::new(),
            significance: ChangeSignificance::new(),
        }
    }

    /// Access the similarity service, e.g. to register extra detectors.
    pub fn similarity_mut(&mut self) -> &mut SimilarityService {
        &mut self.similarity
    }

    /// Produce deduplicated candidates sorted by descending confidence.
    pub fn detect(&self, diff: &SnapshotDiff) -> Vec<LineageCandidate> {
        let mut candidates: Vec<LineageCandidate> = Vec::new();

        // Appeared side: added plus the after-side of modified and
        // unchanged records.
        let appeared: Vec<&FunctionRecord> = diff
            .added
            .iter()
            .chain(diff.modified.iter().map(|m| &m.after))
            .chain(diff.unchanged.iter())
            .collect();
        let added_ids: FxHashSet<&str> = diff
            .added
            .iter()
            .map(|r| r.physical_id.as_str())
            .collect();

        for removed in &diff.removed {
            let mut hits: Vec<(&FunctionRecord, f64)> = Vec::new();
            for candidate in &appeared {
                let score = self.similarity.score(removed, candidate);
                if score >= self.config.split_min_similarity {
                    hits.push((candidate, score));
                }
            }
            hits.sort_by(|a, b| b.1.total_cmp(&a.1));

            // Strong single-target pairing. A best match that already
            // existed before this revision means the removed body was
            // absorbed into it — an inline, not a rename.
            if let Some(&(best, best_score)) = hits.first() {
                if best_score >= self.config.min_similarity {
                    let kind = if added_ids.contains(best.physical_id.as_str()) {
                        infer_kind(removed, best)
                    } else {
                        LineageKind::Inline
                    };
                    candidates.push(LineageCandidate {
                        from_ids: vec![removed.physical_id.clone()],
                        to_ids: vec![best.physical_id.clone()],
                        kind,
                        confidence: best_score,
                        note: format!(
                            "{} -> {} (similarity {:.2})",
                            removed.display_name, best.display_name, best_score
                        ),
                    });
                }
            }

            // Split: one removed correlating with two or more added
            // records, each above the split floor.
            if self.config.detect_splits {
                let split_targets: Vec<&(&FunctionRecord, f64)> = hits
                    .iter()
                    .filter(|(record, _)| {
                        diff.added
                            .iter()
                            .any(|a| a.physical_id == record.physical_id)
                    })
                    .collect();
                if split_targets.len() >= 2 {
                    let avg = split_targets.iter().map(|(_, s)| s).sum::<f64>()
                        / split_targets.len() as f64;
                    candidates.push(LineageCandidate {
                        from_ids: vec![removed.physical_id.clone()],
                        to_ids: split_targets
                            .iter()
                            .map(|(record, _)| record.physical_id.clone())
                            .collect(),
                        kind: LineageKind::Split,
                        confidence: avg,
                        note: format!(
                            "{} split into {} functions (avg similarity {:.2})",
                            removed.display_name,
                            split_targets.len(),
                            avg
                        ),
                    });
                }
            }
        }

        // Modified pairs with drastic enough changes become
        // signature-change candidates.
        for pair in &diff.modified {
            let score = self.significance.score(pair);
            if score >= self.config.min_significance {
                candidates.push(LineageCandidate {
                    from_ids: vec![pair.before.physical_id.clone()],
                    to_ids: vec![pair.after.physical_id.clone()],
                    kind: LineageKind::SignatureChange,
                    confidence: score / 100.0,
                    note: format!(
                        "{} changed significantly (score {score:.0})",
                        pair.after.display_name
                    ),
                });
            }
        }

        dedupe(candidates)
    }

    /// Persist candidates as draft lineages, preserving the originating
    /// commit of the `to` snapshot.
    pub fn persist_drafts(
        &self,
        store: &SnapshotStore,
        candidates: &[LineageCandidate],
        git_commit: Option<&str>,
    ) -> Result<Vec<Lineage>, EngineError> {
        let now = now_ms();
        let lineages: Vec<Lineage> = candidates
            .iter()
            .map(|c| Lineage {
                id: Uuid::new_v4().to_string(),
                from_ids: c.from_ids.clone(),
                to_ids: c.to_ids.clone(),
                kind: c.kind,
                status: LineageStatus::Draft,
                confidence: c.confidence,
                note: Some(c.note.clone()),
                git_commit: git_commit.map(str::to_string),
                created_at: now,
            })
            .collect();
        store.save_lineages(&lineages)?;
        Ok(lineages)
    }
}

/// Kind for a single-target pairing: signature shape differs →
/// signature-change; otherwise rename.
fn infer_kind(removed: &FunctionRecord, target: &FunctionRecord) -> LineageKind {
    let removed_shape: Vec<&str> = removed
        .parameters
        .iter()
        .map(|p| p.type_simple.as_str())
        .collect();
    let target_shape: Vec<&str> = target
        .parameters
        .iter()
        .map(|p| p.type_simple.as_str())
        .collect();

    if removed_shape != target_shape || removed.return_type != target.return_type {
        LineageKind::SignatureChange
    } else {
        LineageKind::Rename
    }
}

/// Key by `(from, sorted to-set)`; highest confidence wins. Output sorted
/// by descending confidence.
fn dedupe(candidates: Vec<LineageCandidate>) -> Vec<LineageCandidate> {
    let mut best: FxHashMap<String, LineageCandidate> = FxHashMap::default();

    for candidate in candidates {
        let mut to_ids: Vec<&str> = candidate.to_ids.iter().map(|id| id.as_str()).collect();
        to_ids.sort_unstable();
        let mut from_ids: Vec<&str> = candidate.from_ids.iter().map(|id| id.as_str()).collect();
        from_ids.sort_unstable();
        let key = format!("{}=>{}", from_ids.join(","), to_ids.join(","));

        match best.get(&key) {
            Some(existing) if existing.confidence >= candidate.confidence => {}
            _ => {
                best.insert(key, candidate);
            }
        }
    }

    let mut result: Vec<LineageCandidate> = best.into_values().collect();
    result.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.note.cmp(&b.note))
    });
    result
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
