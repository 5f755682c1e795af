//! Migration tests: idempotent opens, version tracking.

use strata_storage::{migrations, DatabaseManager, SnapshotStore};
use tempfile::TempDir;

#[test]
fn opening_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.db");

    {
        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(store.count_snapshots().unwrap(), 0);
    }
    // Reopen: migrations must not re-run or fail.
    let store = SnapshotStore::open(&path).unwrap();
    assert_eq!(store.count_snapshots().unwrap(), 0);
}

#[test]
fn schema_version_is_recorded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.db");
    let db = DatabaseManager::open(&path).unwrap();

    let version = db
        .with_reader(|conn| migrations::schema_version(conn))
        .unwrap();
    assert_eq!(version, 1);
}

#[test]
fn all_tables_exist_after_migration() {
    let db = DatabaseManager::open_in_memory().unwrap();
    let tables: Vec<String> = db
        .with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .map_err(|e| strata_core::errors::StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| strata_core::errors::StorageError::SqliteError {
                    message: e.to_string(),
                })?;
            let mut names = Vec::new();
            for row in rows {
                names.push(row.map_err(|e| strata_core::errors::StorageError::SqliteError {
                    message: e.to_string(),
                })?);
            }
            Ok(names)
        })
        .unwrap();

    for expected in [
        "snapshots",
        "functions",
        "parameters",
        "quality_metrics",
        "call_edges",
        "source_files",
        "lineages",
        "function_descriptions",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
    }
}

/// Reads go through a query-only connection for file-backed stores.
#[test]
fn reader_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strata.db");
    let db = DatabaseManager::open(&path).unwrap();

    let result = db.with_reader(|conn| {
        conn.execute("INSERT INTO lineages (id, from_ids, to_ids, kind, status, confidence, created_at) VALUES ('x', '[]', '[]', 'rename', 'draft', 1.0, 0)", [])
            .map_err(|e| strata_core::errors::StorageError::SqliteError {
                message: e.to_string(),
            })?;
        Ok(())
    });
    assert!(result.is_err(), "query_only reader must reject writes");
}
