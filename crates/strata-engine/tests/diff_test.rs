//! Diff engine tests: pairing by identity tiers, change grading,
//! determinism.

use std::path::PathBuf;

use strata_analysis::extract;
use strata_analysis::identity;
use strata_analysis::scanner::{Language, SourceUnit};
use strata_core::config::MetricsThresholds;
use strata_core::hash::sha256_hex;
use strata_engine::SnapshotDiffer;
use strata_storage::{SnapshotOptions, SnapshotStore};
use strata_core::types::SnapshotId;

fn snapshot_from(store: &SnapshotStore, files: &[(&str, &str)]) -> SnapshotId {
    let mut functions = Vec::new();
    for (file, source) in files {
        let unit = SourceUnit {
            path: PathBuf::from(file),
            relative_path: file.to_string(),
            language: Language::TypeScript,
            content: source.to_string(),
            file_hash: sha256_hex(source.as_bytes()),
            file_size: source.len() as u64,
            mtime_ms: None,
        };
        let analysis = extract::extract_file(&unit).unwrap();
        functions.extend(identity::mint_records(&analysis));
    }
    store
        .save_snapshot(
            &functions,
            &[],
            SnapshotOptions {
                config_hash: "test".to_string(),
                project_root: "/p".to_string(),
                ..SnapshotOptions::default()
            },
        )
        .unwrap()
}

fn differ(store: &SnapshotStore) -> SnapshotDiffer<'_> {
    SnapshotDiffer::new(store, MetricsThresholds::default())
}

/// diff(S, S) is empty with everything unchanged.
#[test]
fn identical_snapshot_ids_short_circuit() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let id = snapshot_from(
        &store,
        &[(
            "a.ts",
            "export function a() { return 1; }\nexport function b() { return 2; }",
        )],
    );

    let diff = differ(&store).diff(&id, &id).unwrap();
    assert!(diff.is_empty());
    assert_eq!(diff.statistics.added_count, 0);
    assert_eq!(diff.statistics.removed_count, 0);
    assert_eq!(diff.statistics.modified_count, 0);
    assert_eq!(diff.statistics.unchanged_count, 2);
    assert_eq!(diff.unchanged.len(), 2);
}

/// Equal sources across two snapshots pair as unchanged.
#[test]
fn identical_content_is_unchanged() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let source = "export function stable(x: number): number { return x; }";
    let from = snapshot_from(&store, &[("a.ts", source)]);
    let to = snapshot_from(&store, &[("a.ts", source)]);

    let diff = differ(&store).diff(&from, &to).unwrap();
    assert!(diff.is_empty());
    assert_eq!(diff.unchanged.len(), 1);
}

/// A rename changes the role: one removed, one added.
#[test]
fn rename_splits_into_removed_and_added() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let from = snapshot_from(
        &store,
        &[("v.ts", "function validate(x: number): boolean { return x > 0; }")],
    );
    let to = snapshot_from(
        &store,
        &[("v.ts", "function isPositive(x: number): boolean { return x > 0; }")],
    );

    let diff = differ(&store).diff(&from, &to).unwrap();
    assert_eq!(diff.removed.len(), 1);
    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.modified.len(), 0);
    assert_eq!(diff.removed[0].name, "validate");
    assert_eq!(diff.added[0].name, "isPositive");
}

/// Same role with a different body pairs as modified; semantic ids agree
/// and content ids differ on every modified pair.
#[test]
fn body_change_pairs_as_modified() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let from = snapshot_from(
        &store,
        &[(
            "calc.ts",
            "export function total(xs: number[]): number { return xs.length; }",
        )],
    );
    let to = snapshot_from(
        &store,
        &[(
            "calc.ts",
            r#"
export function total(xs: number[]): number {
    let sum = 0;
    for (const x of xs) {
        if (x > 0) { sum += x; }
    }
    return sum;
}
"#,
        )],
    );

    let diff = differ(&store).diff(&from, &to).unwrap();
    assert_eq!(diff.modified.len(), 1);
    assert_eq!(diff.added.len(), 0);
    assert_eq!(diff.removed.len(), 0);

    let pair = &diff.modified[0];
    assert_eq!(pair.before.semantic_id, pair.after.semantic_id);
    assert_ne!(pair.before.content_id, pair.after.content_id);

    // Complexity went up; the change list carries it with an impact.
    let fields: Vec<&str> = pair.changes.iter().map(|c| c.field.as_str()).collect();
    assert!(fields.contains(&"cyclomaticComplexity"), "fields: {fields:?}");
    // Location-only fields never surface.
    assert!(!fields.contains(&"startLine"));
    assert!(!fields.contains(&"endLine"));

    assert!(diff.statistics.complexity_delta > 0);
}

#[test]
fn added_and_removed_track_new_and_deleted_files() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let from = snapshot_from(
        &store,
        &[
            ("keep.ts", "export function kept() { return 1; }"),
            ("old.ts", "export function obsolete() { return 0; }"),
        ],
    );
    let to = snapshot_from(
        &store,
        &[
            ("keep.ts", "export function kept() { return 1; }"),
            ("new.ts", "export function fresh() { return 2; }"),
        ],
    );

    let diff = differ(&store).diff(&from, &to).unwrap();
    assert_eq!(diff.unchanged.len(), 1);
    assert_eq!(diff.removed.len(), 1);
    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.removed[0].name, "obsolete");
    assert_eq!(diff.added[0].name, "fresh");
}

/// Equal inputs produce identical ordered output.
#[test]
fn diff_is_deterministic() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let from = snapshot_from(
        &store,
        &[
            ("b.ts", "export function beta() { return 2; }"),
            ("a.ts", "export function alpha() { return 1; }"),
        ],
    );
    let to = snapshot_from(
        &store,
        &[
            ("b.ts", "export function beta() { return 20; }"),
            ("a.ts", "export function alpha() { return 10; }"),
            ("c.ts", "export function gamma() { return 3; }"),
        ],
    );

    let first = differ(&store).diff(&from, &to).unwrap();
    let second = differ(&store).diff(&from, &to).unwrap();

    let names =
        |records: &[strata_core::types::FunctionRecord]| -> Vec<String> {
            records.iter().map(|r| r.name.clone()).collect()
        };
    assert_eq!(names(&first.added), names(&second.added));
    assert_eq!(names(&first.unchanged), names(&second.unchanged));
    assert_eq!(first.modified.len(), second.modified.len());
    // Sorted by file path: a.ts before b.ts.
    assert_eq!(first.modified[0].after.name, "alpha");
    assert_eq!(first.modified[1].after.name, "beta");
}

#[test]
fn missing_snapshot_aborts() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let real = snapshot_from(&store, &[("a.ts", "export function a() {}")]);
    let missing = SnapshotId::new("missing");
    assert!(differ(&store).diff(&real, &missing).is_err());
    assert!(differ(&store).diff(&missing, &real).is_err());
}
