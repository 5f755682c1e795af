//! Snapshot store tests: round trips, phased writes, transactional
//! rollback, and the query surface.

use smallvec::SmallVec;
use strata_core::types::{
    AnalysisLevel, CallEdge, CallEdgeMetadata, CallType, ContentId, FunctionKind,
    FunctionRecord, Lineage, LineageKind, LineageStatus, Parameter, PhysicalId, QualityMetrics,
    SemanticId, SnapshotId,
};
use strata_storage::queries::filter::{FilterOp, FilterValue, FunctionFilter, FunctionQuery};
use strata_storage::{SnapshotOptions, SnapshotQuery, SnapshotStore};

fn record(name: &str, file: &str, line: u32, cc: u32) -> FunctionRecord {
    FunctionRecord {
        physical_id: PhysicalId::mint(),
        semantic_id: SemanticId::new(format!("sem-{file}-{name}")),
        content_id: ContentId::new(format!("content-{name}-{cc}")),
        name: name.to_string(),
        display_name: name.to_string(),
        signature: format!("function {name}(a: number): number"),
        signature_hash: format!("sig-{name}"),
        return_type: Some("number".to_string()),
        file_path: file.to_string(),
        file_hash: "filehash".to_string(),
        start_line: line,
        end_line: line + 5,
        start_column: 0,
        end_column: 1,
        ast_hash: format!("ast-{name}-{cc}"),
        context_path: SmallVec::new(),
        kind: FunctionKind::Declaration,
        nesting_level: 0,
        is_exported: true,
        is_async: false,
        is_generator: false,
        is_arrow: false,
        is_method: false,
        is_constructor: false,
        is_static: false,
        is_accessor: false,
        access_modifier: None,
        js_doc: Some(format!("/** {name} docs */")),
        source_code: Some(format!("function {name}() {{ return 1; }}")),
        parameters: vec![Parameter {
            name: "a".to_string(),
            type_text: "number".to_string(),
            type_simple: "number".to_string(),
            position: 0,
            is_optional: false,
            is_rest: false,
            default_value: None,
            description: None,
        }],
        metrics: Some(QualityMetrics {
            lines_of_code: 3,
            total_lines: 5,
            cyclomatic_complexity: cc,
            parameter_count: 1,
            ..QualityMetrics::default()
        }),
    }
}

fn options() -> SnapshotOptions {
    SnapshotOptions {
        config_hash: "confhash".to_string(),
        project_root: "/tmp/project".to_string(),
        ..SnapshotOptions::default()
    }
}

#[test]
fn save_and_load_round_trip() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let functions = vec![
        record("alpha", "src/a.ts", 1, 2),
        record("beta", "src/a.ts", 10, 12),
        record("gamma", "src/b.ts", 3, 25),
    ];

    let id = store.save_snapshot(&functions, &[], options()).unwrap();
    assert!(!id.as_str().is_empty());

    let loaded = store.functions_of(&id).unwrap();
    assert_eq!(loaded.len(), 3);
    // (file_path, start_line) order.
    let names: Vec<&str> = loaded.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);

    let alpha = &loaded[0];
    assert_eq!(alpha.parameters.len(), 1);
    assert_eq!(alpha.parameters[0].type_simple, "number");
    assert_eq!(alpha.metrics.as_ref().unwrap().cyclomatic_complexity, 2);
    assert_eq!(alpha.js_doc.as_deref(), Some("/** alpha docs */"));
}

#[test]
fn metadata_roll_up_after_save() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let functions = vec![
        record("low1", "src/a.ts", 1, 2),
        record("moderate1", "src/a.ts", 20, 8),
        record("veryhigh1", "src/b.ts", 1, 30),
    ];

    let id = store.save_snapshot(&functions, &[], options()).unwrap();
    let snapshot = store.get_snapshot(id.as_str()).unwrap();

    let m = &snapshot.metadata;
    assert_eq!(m.total_functions, 3);
    assert_eq!(m.exported_functions, 3);
    assert_eq!(m.max_complexity, 30);
    assert!((m.avg_complexity - (2.0 + 8.0 + 30.0) / 3.0).abs() < 1e-9);
    assert_eq!(m.complexity_distribution.low, 1);
    assert_eq!(m.complexity_distribution.moderate, 1);
    assert_eq!(m.complexity_distribution.very_high, 1);
    assert_eq!(m.file_extensions.get("ts"), Some(&2));
    assert_eq!(snapshot.analysis_level(), AnalysisLevel::Basic);
    assert!(m.basic_analysis_completed);
    assert!(!m.call_graph_analysis_completed);
}

#[test]
fn phased_writes_promote_analysis_level() {
    let store = SnapshotStore::open_in_memory().unwrap();

    let snapshot = store.create_snapshot(options()).unwrap();
    assert_eq!(snapshot.analysis_level(), AnalysisLevel::None);
    let id = snapshot.id.clone();

    let functions = vec![record("one", "a.ts", 1, 1), record("two", "a.ts", 9, 3)];
    store.store_functions(&id, &functions, &[]).unwrap();
    let after_basic = store.get_snapshot(id.as_str()).unwrap();
    assert_eq!(after_basic.analysis_level(), AnalysisLevel::Basic);

    let edge = CallEdge {
        id: "edge-1".to_string(),
        caller_function_id: functions[0].physical_id.clone(),
        callee_function_id: Some(functions[1].physical_id.clone()),
        callee_name: "two".to_string(),
        callee_signature: None,
        caller_class_name: None,
        callee_class_name: None,
        call_type: CallType::Direct,
        call_context: None,
        line_number: 2,
        column_number: 4,
        is_async: false,
        is_chained: false,
        confidence_score: 1.0,
        metadata: CallEdgeMetadata::default(),
    };
    store.store_call_edges(&id, &[edge]).unwrap();

    let after_edges = store.get_snapshot(id.as_str()).unwrap();
    assert_eq!(after_edges.analysis_level(), AnalysisLevel::CallGraph);
    assert!(after_edges.metadata.call_graph_analysis_completed);

    let edges = store.call_edges_of(&id).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].callee_name, "two");
}

#[test]
fn edge_write_rejects_unknown_endpoints() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let functions = vec![record("caller", "a.ts", 1, 1)];
    let id = store.save_snapshot(&functions, &[], options()).unwrap();

    let edge = CallEdge {
        id: "edge-x".to_string(),
        caller_function_id: PhysicalId::mint(), // not in the snapshot
        callee_function_id: None,
        callee_name: "ghost".to_string(),
        callee_signature: None,
        caller_class_name: None,
        callee_class_name: None,
        call_type: CallType::Direct,
        call_context: None,
        line_number: 1,
        column_number: 0,
        is_async: false,
        is_chained: false,
        confidence_score: 1.0,
        metadata: CallEdgeMetadata::default(),
    };
    assert!(store.store_call_edges(&id, &[edge]).is_err());
    assert_eq!(store.call_edges_of(&id).unwrap().len(), 0);
}

/// A failed snapshot write leaves the store unchanged.
#[test]
fn failed_snapshot_write_rolls_back() {
    let store = SnapshotStore::open_in_memory().unwrap();

    let duplicate = record("dup", "a.ts", 1, 1);
    let mut copy = record("dup2", "a.ts", 8, 1);
    copy.physical_id = duplicate.physical_id.clone(); // primary key collision

    let before = store.count_snapshots().unwrap();
    let result = store.save_snapshot(&[duplicate, copy], &[], options());
    assert!(result.is_err());

    assert_eq!(store.count_snapshots().unwrap(), before);
    let all = store.get_snapshots(&SnapshotQuery::default()).unwrap();
    assert!(all.is_empty(), "no partial snapshot may escape");
}

#[test]
fn snapshots_list_most_recent_first() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(store.save_snapshot(&[], &[], options()).unwrap());
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let listed = store.get_snapshots(&SnapshotQuery::default()).unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed[0].created_at >= listed[1].created_at);
    assert!(listed[1].created_at >= listed[2].created_at);
    assert_eq!(listed[0].id, ids[2]);

    let paged = store
        .get_snapshots(&SnapshotQuery {
            limit: Some(1),
            offset: Some(1),
            ..SnapshotQuery::default()
        })
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, ids[1]);
}

#[test]
fn query_functions_supports_filters_and_sort() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let functions = vec![
        record("parseInput", "src/parse.ts", 1, 4),
        record("parseHeader", "src/parse.ts", 30, 9),
        record("emitOutput", "src/emit.ts", 1, 2),
    ];
    let id = store.save_snapshot(&functions, &[], options()).unwrap();

    // LIKE filter.
    let like = store
        .query_functions(
            &id,
            &FunctionQuery {
                filters: vec![FunctionFilter {
                    field: "name".to_string(),
                    op: FilterOp::Like,
                    value: FilterValue::Text("parse%".to_string()),
                }],
                ..FunctionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(like.len(), 2);

    // Comparison over a metric column, sorted descending.
    let complex = store
        .query_functions(
            &id,
            &FunctionQuery {
                filters: vec![FunctionFilter {
                    field: "cyclomatic_complexity".to_string(),
                    op: FilterOp::Ge,
                    value: FilterValue::Number(4.0),
                }],
                sort: Some("cyclomatic_complexity".to_string()),
                descending: true,
                ..FunctionQuery::default()
            },
        )
        .unwrap();
    let names: Vec<&str> = complex.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["parseHeader", "parseInput"]);

    // IN filter.
    let chosen = store
        .query_functions(
            &id,
            &FunctionQuery {
                filters: vec![FunctionFilter {
                    field: "name".to_string(),
                    op: FilterOp::In,
                    value: FilterValue::List(vec![
                        "emitOutput".to_string(),
                        "parseInput".to_string(),
                    ]),
                }],
                ..FunctionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(chosen.len(), 2);

    // Keyword over name/docs/source.
    let keyword = store
        .query_functions(
            &id,
            &FunctionQuery {
                keyword: Some("emitOutput".to_string()),
                ..FunctionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(keyword.len(), 1);
    assert_eq!(keyword[0].name, "emitOutput");

    // Limit + offset in deterministic file/line order.
    let paged = store
        .query_functions(
            &id,
            &FunctionQuery {
                limit: Some(2),
                offset: Some(1),
                ..FunctionQuery::default()
            },
        )
        .unwrap();
    assert_eq!(paged.len(), 2);
    assert_eq!(paged[0].name, "parseInput");
}

#[test]
fn unknown_snapshot_reads_fail() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let missing = SnapshotId::new("does-not-exist");
    assert!(store.functions_of(&missing).is_err());
    assert!(store.get_snapshot("does-not-exist").is_err());
}

#[test]
fn delete_snapshot_cascades() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let functions = vec![record("gone", "a.ts", 1, 1)];
    let id = store.save_snapshot(&functions, &[], options()).unwrap();

    store.delete_snapshot(&id).unwrap();
    assert!(store.get_snapshot(id.as_str()).is_err());
    assert_eq!(store.count_snapshots().unwrap(), 0);
}

#[test]
fn id_prefix_lookup_returns_all_matches() {
    let store = SnapshotStore::open_in_memory().unwrap();
    // Seed headers with controlled ids through the raw writer.
    store
        .with_writer(|conn| {
            for suffix in ["one", "two", "three"] {
                conn.execute(
                    "INSERT INTO snapshots (id, created_at, project_root, config_hash, scope, metadata)
                     VALUES (?1, 0, '/p', 'c', 'src', '{}')",
                    rusqlite::params![format!("a1b2-{suffix}")],
                )
                .map_err(|e| strata_core::errors::StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            }
            Ok(())
        })
        .unwrap();

    let matches = store.find_by_id_prefix("a1b2").unwrap();
    assert_eq!(matches.len(), 3);
    let one = store.find_by_id_prefix("a1b2-o").unwrap();
    assert_eq!(one.len(), 1);
}

#[test]
fn lineages_round_trip() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let lineage = Lineage {
        id: "lin-1".to_string(),
        from_ids: vec![PhysicalId::mint()],
        to_ids: vec![PhysicalId::mint(), PhysicalId::mint()],
        kind: LineageKind::Split,
        status: LineageStatus::Draft,
        confidence: 0.8,
        note: Some("split into two".to_string()),
        git_commit: Some("abc1234".to_string()),
        created_at: 42,
    };
    store.save_lineages(std::slice::from_ref(&lineage)).unwrap();

    let drafts = store.list_lineages(Some(LineageStatus::Draft)).unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].kind, LineageKind::Split);
    assert_eq!(drafts[0].to_ids.len(), 2);

    store
        .update_lineage_status("lin-1", LineageStatus::Confirmed)
        .unwrap();
    assert!(store.list_lineages(Some(LineageStatus::Draft)).unwrap().is_empty());
    assert_eq!(
        store
            .list_lineages(Some(LineageStatus::Confirmed))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn description_import_skips_invalid_entries() {
    let store = SnapshotStore::open_in_memory().unwrap();
    let json = r#"[
        {"semanticId": "sem-1", "description": "parses input", "source": "ai", "aiModel": "m1"},
        {"semanticId": "sem-2", "description": "emits output"},
        {"description": "missing id"},
        {"semanticId": "sem-4"}
    ]"#;

    let report = store.import_descriptions(json).unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 2);

    let loaded = store
        .get_description(&SemanticId::new("sem-1"))
        .unwrap()
        .unwrap();
    assert_eq!(loaded.description, "parses input");
    assert_eq!(loaded.ai_model.as_deref(), Some("m1"));
}
