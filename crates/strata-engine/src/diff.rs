//! Snapshot diffing: pair records by semantic id, grade per-field changes.

use strata_core::config::MetricsThresholds;
use strata_core::errors::EngineError;
use strata_core::types::collections::FxHashMap;
use strata_core::types::{
    ChangeDetail, ChangeImpact, DiffStatistics, FunctionRecord, ModifiedFunction, SnapshotDiff,
    SnapshotId,
};
use strata_storage::SnapshotStore;

/// Compares two snapshots. Deterministic: every bucket is emitted sorted
/// by `(file_path, start_line, name)`.
pub struct SnapshotDiffer<'a> {
    store: &'a SnapshotStore,
    thresholds: MetricsThresholds,
}

impl<'a> SnapshotDiffer<'a> {
    pub fn new(store: &'a SnapshotStore, thresholds: MetricsThresholds) -> Self {
        Self { store, thresholds }
    }

    /// Diff `from` against `to`. Unknown snapshot ids abort before any
    /// output is produced.
    pub fn diff(&self, from: &SnapshotId, to: &SnapshotId) -> Result<SnapshotDiff, EngineError> {
        // Both must exist even for the short-circuit case.
        self.store.get_snapshot(from.as_str())?;
        self.store.get_snapshot(to.as_str())?;

        // Identical ids short-circuit to an empty diff.
        if from == to {
            let mut unchanged = self.store.functions_of(from)?;
            sort_records(&mut unchanged);
            let statistics = DiffStatistics {
                unchanged_count: unchanged.len(),
                ..DiffStatistics::default()
            };
            return Ok(SnapshotDiff {
                from_snapshot: from.clone(),
                to_snapshot: to.clone(),
                added: Vec::new(),
                removed: Vec::new(),
                modified: Vec::new(),
                unchanged,
                statistics,
            });
        }

        let from_records = self.store.functions_of(from)?;
        let to_records = self.store.functions_of(to)?;
        Ok(self.diff_records(from, to, from_records, to_records))
    }

    /// Core pairing over already-loaded record sets.
    pub fn diff_records(
        &self,
        from: &SnapshotId,
        to: &SnapshotId,
        from_records: Vec<FunctionRecord>,
        to_records: Vec<FunctionRecord>,
    ) -> SnapshotDiff {
        // Semantic ids are role-unique in practice; duplicates (rare,
        // re-declared roles) pair positionally.
        let mut from_by_semantic: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (idx, record) in from_records.iter().enumerate() {
            from_by_semantic
                .entry(record.semantic_id.as_str().to_string())
                .or_default()
                .push(idx);
        }

        let mut added = Vec::new();
        let mut modified = Vec::new();
        let mut unchanged = Vec::new();
        let mut paired = vec![false; from_records.len()];

        for record in to_records {
            let candidates = from_by_semantic.get_mut(record.semantic_id.as_str());
            let partner = candidates.and_then(|c| if c.is_empty() { None } else { Some(c.remove(0)) });
            match partner {
                Some(idx) => {
                    paired[idx] = true;
                    let before = &from_records[idx];
                    if before.content_id == record.content_id {
                        unchanged.push(record);
                    } else {
                        let changes = self.compute_changes(before, &record);
                        modified.push(ModifiedFunction {
                            before: before.clone(),
                            after: record,
                            changes,
                        });
                    }
                }
                None => added.push(record),
            }
        }

        let mut removed: Vec<FunctionRecord> = from_records
            .into_iter()
            .zip(paired)
            .filter_map(|(record, was_paired)| (!was_paired).then_some(record))
            .collect();

        sort_records(&mut added);
        sort_records(&mut removed);
        sort_records(&mut unchanged);
        modified.sort_by(|a, b| {
            (&a.after.file_path, a.after.start_line, &a.after.name).cmp(&(
                &b.after.file_path,
                b.after.start_line,
                &b.after.name,
            ))
        });

        let complexity_delta: i64 = modified.iter().map(|m| cc_delta(m)).sum();
        let lines_delta: i64 = modified.iter().map(|m| loc_delta(m)).sum();

        let statistics = DiffStatistics {
            added_count: added.len(),
            removed_count: removed.len(),
            modified_count: modified.len(),
            unchanged_count: unchanged.len(),
            complexity_delta,
            lines_delta,
        };

        SnapshotDiff {
            from_snapshot: from.clone(),
            to_snapshot: to.clone(),
            added,
            removed,
            modified,
            unchanged,
            statistics,
        }
    }

    /// Per-field change entries. Location-only fields never surface.
    fn compute_changes(&self, before: &FunctionRecord, after: &FunctionRecord) -> Vec<ChangeDetail> {
        let mut changes = Vec::new();

        if before.signature != after.signature {
            changes.push(ChangeDetail {
                field: "signature".to_string(),
                old_value: before.signature.clone(),
                new_value: after.signature.clone(),
                impact: ChangeImpact::High,
            });
        }
        if before.return_type != after.return_type {
            changes.push(ChangeDetail {
                field: "returnType".to_string(),
                old_value: option_text(&before.return_type),
                new_value: option_text(&after.return_type),
                impact: ChangeImpact::Medium,
            });
        }
        if before.parameters.len() != after.parameters.len() {
            changes.push(ChangeDetail {
                field: "parameterCount".to_string(),
                old_value: before.parameters.len().to_string(),
                new_value: after.parameters.len().to_string(),
                impact: ChangeImpact::High,
            });
        }
        if before.is_exported != after.is_exported {
            changes.push(ChangeDetail {
                field: "isExported".to_string(),
                old_value: before.is_exported.to_string(),
                new_value: after.is_exported.to_string(),
                impact: ChangeImpact::Medium,
            });
        }
        if before.is_async != after.is_async {
            changes.push(ChangeDetail {
                field: "isAsync".to_string(),
                old_value: before.is_async.to_string(),
                new_value: after.is_async.to_string(),
                impact: ChangeImpact::Medium,
            });
        }

        if let (Some(before_m), Some(after_m)) = (&before.metrics, &after.metrics) {
            self.push_metric_change(
                &mut changes,
                "cyclomaticComplexity",
                before_m.cyclomatic_complexity,
                after_m.cyclomatic_complexity,
                self.thresholds.complexity_medium_delta,
                self.thresholds.complexity_high_delta,
            );
            self.push_metric_change(
                &mut changes,
                "cognitiveComplexity",
                before_m.cognitive_complexity,
                after_m.cognitive_complexity,
                self.thresholds.complexity_medium_delta,
                self.thresholds.complexity_high_delta,
            );
            self.push_metric_change(
                &mut changes,
                "linesOfCode",
                before_m.lines_of_code,
                after_m.lines_of_code,
                self.thresholds.lines_medium_delta,
                self.thresholds.lines_high_delta,
            );
        }

        changes
    }

    fn push_metric_change(
        &self,
        changes: &mut Vec<ChangeDetail>,
        field: &str,
        old: u32,
        new: u32,
        medium_delta: u32,
        high_delta: u32,
    ) {
        if old == new {
            return;
        }
        let delta = old.abs_diff(new);
        let impact = if delta >= high_delta {
            ChangeImpact::High
        } else if delta >= medium_delta {
            ChangeImpact::Medium
        } else {
            ChangeImpact::Low
        };
        changes.push(ChangeDetail {
            field: field.to_string(),
            old_value: old.to_string(),
            new_value: new.to_string(),
            impact,
        });
    }
}

fn sort_records(records: &mut [FunctionRecord]) {
    records.sort_by(|a, b| {
        (&a.file_path, a.start_line, &a.name).cmp(&(&b.file_path, b.start_line, &b.name))
    });
}

fn option_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn cc_delta(m: &ModifiedFunction) -> i64 {
    match (&m.before.metrics, &m.after.metrics) {
        (Some(b), Some(a)) => a.cyclomatic_complexity as i64 - b.cyclomatic_complexity as i64,
        _ => 0,
    }
}

fn loc_delta(m: &ModifiedFunction) -> i64 {
    match (&m.before.metrics, &m.after.metrics) {
        (Some(b), Some(a)) => a.lines_of_code as i64 - b.lines_of_code as i64,
        _ => 0,
    }
}
