//! End-to-end pipeline tests over scratch projects on disk.

use std::fs;
use std::path::Path;

use strata_core::config::StrataConfig;
use strata_core::types::AnalysisLevel;
use strata_core::NullEventHandler;
use strata_engine::{AnalysisPipeline, PipelineOptions};
use strata_storage::queries::filter::FunctionQuery;
use strata_storage::SnapshotStore;
use tempfile::TempDir;

fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn full_cycle_persists_functions_edges_and_sources() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "src/lib/math.ts",
        r#"
export function add(a: number, b: number): number { return a + b; }
export function double(a: number): number { return add(a, a); }
"#,
    );
    write_file(
        dir.path(),
        "src/main.ts",
        r#"
import { double } from './lib/math';

export function main(): number {
    return double(21);
}
"#,
    );
    // An ignored directory must not contribute records.
    write_file(
        dir.path(),
        "node_modules/pkg/index.ts",
        "export function hidden() {}",
    );

    let store = SnapshotStore::open_in_memory().unwrap();
    let pipeline = AnalysisPipeline::new(StrataConfig::default());
    let result = pipeline
        .run(dir.path(), &store, &PipelineOptions::default(), &NullEventHandler)
        .unwrap();

    assert_eq!(result.files_analyzed, 2);
    assert_eq!(result.functions_extracted, 3);
    assert_eq!(result.parse_failures, 0);
    assert!(result.call_edges >= 2, "expected add + double edges, got {}", result.call_edges);

    let snapshot = store.get_snapshot(result.snapshot_id.as_str()).unwrap();
    assert_eq!(snapshot.analysis_level(), AnalysisLevel::CallGraph);
    assert_eq!(snapshot.metadata.total_functions, 3);
    assert_eq!(snapshot.metadata.total_files, 2);
    assert!(snapshot.metadata.basic_analysis_completed);
    assert!(snapshot.metadata.call_graph_analysis_completed);

    // Records come back in (file path, start line) order with metrics.
    let functions = store.functions_of(&result.snapshot_id).unwrap();
    assert_eq!(functions.len(), 3);
    assert!(functions.windows(2).all(|w| {
        (w[0].file_path.as_str(), w[0].start_line) <= (w[1].file_path.as_str(), w[1].start_line)
    }));
    assert!(functions.iter().all(|f| f.metrics.is_some()));

    // The cross-file call resolved to a function in the same snapshot.
    let edges = store.call_edges_of(&result.snapshot_id).unwrap();
    let cross = edges.iter().find(|e| e.callee_name == "double").unwrap();
    assert!(cross.callee_function_id.is_some());
    assert_eq!(cross.confidence_score, 0.9);

    // Source blobs round-trip.
    let sources = store.source_files_of(&result.snapshot_id).unwrap();
    assert_eq!(sources.len(), 2);
    assert!(sources.iter().any(|s| s.file_path == "src/main.ts"));
    assert!(sources.iter().all(|s| !s.content.is_empty()));
}

/// Twenty near-identical functions: all records survive with distinct
/// identities and the snapshot is queryable.
#[test]
fn twenty_lookalikes_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut source = String::new();
    for i in 0..20 {
        source.push_str(&format!(
            "export const func{i} = (param: string): string => param + \"i\";\n"
        ));
    }
    write_file(dir.path(), "src/lookalikes.ts", &source);

    let store = SnapshotStore::open_in_memory().unwrap();
    let pipeline = AnalysisPipeline::new(StrataConfig::default());
    let result = pipeline
        .run(dir.path(), &store, &PipelineOptions::default(), &NullEventHandler)
        .unwrap();

    assert!(!result.snapshot_id.as_str().is_empty());
    assert_eq!(result.functions_extracted, 20);

    let rows = store
        .query_functions(&result.snapshot_id, &FunctionQuery::default())
        .unwrap();
    assert_eq!(rows.len(), 20);

    let mut physical: Vec<_> = rows.iter().map(|r| r.physical_id.clone()).collect();
    physical.sort();
    physical.dedup();
    assert_eq!(physical.len(), 20);

    let mut semantic: Vec<_> = rows.iter().map(|r| r.semantic_id.clone()).collect();
    semantic.sort();
    semantic.dedup();
    assert_eq!(semantic.len(), 20);
}

/// Degenerate files contribute nothing but never abort the run.
#[test]
fn degenerate_files_do_not_abort_the_pipeline() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "src/good.ts", "export function ok() { return 1; }");
    write_file(dir.path(), "src/empty.ts", "");

    let store = SnapshotStore::open_in_memory().unwrap();
    let pipeline = AnalysisPipeline::new(StrataConfig::default());
    let result = pipeline
        .run(dir.path(), &store, &PipelineOptions::default(), &NullEventHandler)
        .unwrap();

    let rows = store.functions_of(&result.snapshot_id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "ok");
}

#[test]
fn quick_mode_caps_analyzed_files() {
    let dir = TempDir::new().unwrap();
    for i in 0..10 {
        write_file(
            dir.path(),
            &format!("src/f{i}.ts"),
            &format!("export function f{i}() {{ return {i}; }}"),
        );
    }

    let mut config = StrataConfig::default();
    config.scan.quick_max_files = Some(4);

    let store = SnapshotStore::open_in_memory().unwrap();
    let pipeline = AnalysisPipeline::new(config);
    let result = pipeline
        .run(dir.path(), &store, &PipelineOptions::default(), &NullEventHandler)
        .unwrap();

    assert_eq!(result.files_analyzed, 4);
}

#[test]
fn skip_call_graph_leaves_basic_level() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "src/a.ts", "export function a() { return 1; }");

    let store = SnapshotStore::open_in_memory().unwrap();
    let pipeline = AnalysisPipeline::new(StrataConfig::default());
    let options = PipelineOptions {
        skip_call_graph: true,
        label: Some("basic-only".to_string()),
        ..PipelineOptions::default()
    };
    let result = pipeline
        .run(dir.path(), &store, &options, &NullEventHandler)
        .unwrap();

    let snapshot = store.get_snapshot(result.snapshot_id.as_str()).unwrap();
    assert_eq!(snapshot.analysis_level(), AnalysisLevel::Basic);
    assert_eq!(snapshot.label.as_deref(), Some("basic-only"));
    assert_eq!(store.call_edges_of(&result.snapshot_id).unwrap().len(), 0);
}
