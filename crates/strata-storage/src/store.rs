//! `SnapshotStore` — the single owner of the database connections.
//!
//! Snapshot writes are transactional: header and child rows commit
//! together or not at all. The same snapshot may instead be populated in
//! phases (functions first, call edges later); each phase is its own
//! transaction and promotes the analysis level, never demoting it.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use strata_core::errors::StorageError;
use strata_core::types::collections::{FxHashMap, FxHashSet};
use strata_core::types::{
    AnalysisLevel, CallEdge, ComplexityDistribution, DescriptionSource, FunctionDescription,
    FunctionRecord, Lineage, LineageStatus, SemanticId, Snapshot, SnapshotId, SnapshotMetadata,
    SourceFileRecord,
};

use crate::connection::DatabaseManager;
use crate::queries::{self, filter::FunctionQuery};

/// Header fields supplied when creating a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub label: Option<String>,
    pub comment: Option<String>,
    pub config_hash: String,
    pub scope: Option<String>,
    pub project_root: String,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub git_tag: Option<String>,
}

/// Paging and scope filter for snapshot listings.
#[derive(Debug, Clone, Default)]
pub struct SnapshotQuery {
    pub scope: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Result of a description batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// SQLite-backed snapshot store.
pub struct SnapshotStore {
    db: DatabaseManager,
}

impl SnapshotStore {
    /// Open a file-backed store, running migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open(path)?,
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self {
            db: DatabaseManager::open_in_memory()?,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    // ── snapshot writes ─────────────────────────────────────────────────

    /// Create an empty snapshot header with `analysisLevel = none`.
    pub fn create_snapshot(&self, options: SnapshotOptions) -> Result<Snapshot, StorageError> {
        let snapshot = new_snapshot(options);
        self.db.with_writer(|conn| {
            queries::snapshots::insert(conn, &snapshot)?;
            Ok(())
        })?;
        tracing::debug!(id = %snapshot.id, "snapshot header created");
        Ok(snapshot)
    }

    /// Persist a complete basic snapshot in one transaction: header,
    /// functions, parameters, metrics, source files, and the metadata
    /// roll-up. Any child failure discards the whole snapshot.
    pub fn save_snapshot(
        &self,
        functions: &[FunctionRecord],
        source_files: &[SourceFileRecord],
        options: SnapshotOptions,
    ) -> Result<SnapshotId, StorageError> {
        let snapshot = new_snapshot(options);
        let id = snapshot.id.clone();

        self.db.with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(write_err)?;
            queries::snapshots::insert(&tx, &snapshot)?;
            write_function_rows(&tx, id.as_str(), functions, source_files)?;
            let metadata = roll_up(&tx, id.as_str(), AnalysisLevel::Basic)?;
            queries::snapshots::update_metadata(&tx, &id, &metadata)?;
            tx.commit().map_err(write_err)
        })?;

        tracing::info!(id = %id, functions = functions.len(), "snapshot saved");
        Ok(id)
    }

    /// Phase write: functions, parameters, metrics, and source files for an
    /// existing snapshot. Promotes the analysis level to `basic`.
    pub fn store_functions(
        &self,
        id: &SnapshotId,
        functions: &[FunctionRecord],
        source_files: &[SourceFileRecord],
    ) -> Result<(), StorageError> {
        self.require_snapshot(id)?;
        self.db.with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(write_err)?;
            write_function_rows(&tx, id.as_str(), functions, source_files)?;
            let metadata = roll_up(&tx, id.as_str(), AnalysisLevel::Basic)?;
            queries::snapshots::update_metadata(&tx, id, &metadata)?;
            tx.commit().map_err(write_err)
        })
    }

    /// Phase write: call edges, written after their endpoints. Promotes the
    /// analysis level to `call-graph`.
    pub fn store_call_edges(
        &self,
        id: &SnapshotId,
        edges: &[CallEdge],
    ) -> Result<(), StorageError> {
        self.require_snapshot(id)?;
        self.db.with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(write_err)?;

            // Resolved endpoints must exist in this snapshot.
            let mut known = FxHashSet::default();
            {
                let mut stmt = tx
                    .prepare("SELECT id FROM functions WHERE snapshot_id = ?1")
                    .map_err(write_err)?;
                let rows = stmt
                    .query_map([id.as_str()], |row| row.get::<_, String>(0))
                    .map_err(write_err)?;
                for row in rows {
                    known.insert(row.map_err(write_err)?);
                }
            }
            for edge in edges {
                if !known.contains(edge.caller_function_id.as_str()) {
                    return Err(StorageError::WriteFailed {
                        message: format!(
                            "call edge caller {} is not in snapshot {}",
                            edge.caller_function_id, id
                        ),
                    });
                }
                if let Some(callee) = &edge.callee_function_id {
                    if !known.contains(callee.as_str()) {
                        return Err(StorageError::WriteFailed {
                            message: format!(
                                "call edge callee {} is not in snapshot {}",
                                callee, id
                            ),
                        });
                    }
                }
            }

            queries::call_edges::insert_batch(&tx, id.as_str(), edges, now_ms())?;
            let metadata = roll_up(&tx, id.as_str(), AnalysisLevel::CallGraph)?;
            queries::snapshots::update_metadata(&tx, id, &metadata)?;
            tx.commit().map_err(write_err)
        })
    }

    /// Delete a snapshot and all owned rows.
    pub fn delete_snapshot(&self, id: &SnapshotId) -> Result<(), StorageError> {
        let deleted = self
            .db
            .with_writer(|conn| queries::snapshots::delete(conn, id.as_str()))?;
        if deleted == 0 {
            return Err(StorageError::SnapshotNotFound {
                identifier: id.to_string(),
            });
        }
        Ok(())
    }

    // ── snapshot reads ──────────────────────────────────────────────────

    /// Fetch a snapshot header by exact id.
    pub fn get_snapshot(&self, id: &str) -> Result<Snapshot, StorageError> {
        self.db
            .with_reader(|conn| queries::snapshots::get(conn, id))?
            .ok_or_else(|| StorageError::SnapshotNotFound {
                identifier: id.to_string(),
            })
    }

    /// Snapshot headers, most-recent-first.
    pub fn get_snapshots(&self, query: &SnapshotQuery) -> Result<Vec<Snapshot>, StorageError> {
        self.db.with_reader(|conn| {
            queries::snapshots::list(
                conn,
                query.scope.as_deref(),
                query.limit.unwrap_or(usize::MAX >> 1),
                query.offset.unwrap_or(0),
            )
        })
    }

    /// Snapshots whose id starts with the prefix, newest first.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Result<Vec<Snapshot>, StorageError> {
        self.db
            .with_reader(|conn| queries::snapshots::find_by_id_prefix(conn, prefix))
    }

    /// Snapshots carrying the label, newest first.
    pub fn find_by_label(&self, label: &str) -> Result<Vec<Snapshot>, StorageError> {
        self.db
            .with_reader(|conn| queries::snapshots::find_by_label(conn, label))
    }

    /// The snapshot materialized for a git commit, when one exists.
    pub fn find_by_git_commit(&self, commit: &str) -> Result<Option<Snapshot>, StorageError> {
        self.db
            .with_reader(|conn| queries::snapshots::find_by_git_commit(conn, commit))
    }

    pub fn count_snapshots(&self) -> Result<i64, StorageError> {
        self.db.with_reader(queries::snapshots::count)
    }

    // ── function reads ──────────────────────────────────────────────────

    /// All functions of a snapshot with parameters and metrics attached,
    /// in (file path, start line) order.
    pub fn functions_of(&self, id: &SnapshotId) -> Result<Vec<FunctionRecord>, StorageError> {
        self.require_snapshot(id)?;
        self.db
            .with_reader(|conn| queries::functions::load_by_snapshot(conn, id.as_str()))
    }

    /// Filtered, sorted, paged function query over one snapshot.
    pub fn query_functions(
        &self,
        id: &SnapshotId,
        query: &FunctionQuery,
    ) -> Result<Vec<FunctionRecord>, StorageError> {
        self.require_snapshot(id)?;
        self.db
            .with_reader(|conn| queries::functions::query(conn, id.as_str(), query))
    }

    /// All call edges of a snapshot.
    pub fn call_edges_of(&self, id: &SnapshotId) -> Result<Vec<CallEdge>, StorageError> {
        self.require_snapshot(id)?;
        self.db
            .with_reader(|conn| queries::call_edges::load_by_snapshot(conn, id.as_str()))
    }

    /// All source files of a snapshot.
    pub fn source_files_of(
        &self,
        id: &SnapshotId,
    ) -> Result<Vec<SourceFileRecord>, StorageError> {
        self.require_snapshot(id)?;
        self.db
            .with_reader(|conn| queries::source_files::load_by_snapshot(conn, id.as_str()))
    }

    // ── lineages ────────────────────────────────────────────────────────

    /// Persist lineage candidates in one transaction.
    pub fn save_lineages(&self, lineages: &[Lineage]) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(write_err)?;
            for lineage in lineages {
                queries::lineages::insert(&tx, lineage)?;
            }
            tx.commit().map_err(write_err)
        })
    }

    pub fn list_lineages(
        &self,
        status: Option<LineageStatus>,
    ) -> Result<Vec<Lineage>, StorageError> {
        self.db
            .with_reader(|conn| queries::lineages::list(conn, status))
    }

    pub fn update_lineage_status(
        &self,
        id: &str,
        status: LineageStatus,
    ) -> Result<(), StorageError> {
        let updated = self
            .db
            .with_writer(|conn| queries::lineages::update_status(conn, id, status))?;
        if updated == 0 {
            return Err(StorageError::FunctionNotFound { id: id.to_string() });
        }
        Ok(())
    }

    // ── descriptions ────────────────────────────────────────────────────

    pub fn upsert_description(
        &self,
        description: &FunctionDescription,
    ) -> Result<(), StorageError> {
        self.db
            .with_writer(|conn| queries::descriptions::upsert(conn, description))
    }

    pub fn get_description(
        &self,
        semantic_id: &SemanticId,
    ) -> Result<Option<FunctionDescription>, StorageError> {
        self.db
            .with_reader(|conn| queries::descriptions::get(conn, semantic_id.as_str()))
    }

    /// Batch import from a JSON array. Entries missing `semanticId` or
    /// `description` are skipped with a warning; the rest import in one
    /// transaction.
    pub fn import_descriptions(&self, json: &str) -> Result<DescriptionImportReport, StorageError> {
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(json).map_err(|e| StorageError::ReadFailed {
                message: format!("description import is not a JSON array: {e}"),
            })?;

        let now = now_ms();
        let mut report = DescriptionImportReport::default();
        let mut valid = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<DescriptionImportEntry>(entry) {
                Ok(entry) if !entry.semantic_id.is_empty() && !entry.description.is_empty() => {
                    valid.push(entry);
                }
                Ok(_) => {
                    tracing::warn!(index, "description entry missing semanticId or description");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "malformed description entry");
                    report.skipped += 1;
                }
            }
        }

        self.db.with_writer(|conn| {
            let tx = conn.unchecked_transaction().map_err(write_err)?;
            for entry in &valid {
                let description = FunctionDescription {
                    semantic_id: SemanticId::new(entry.semantic_id.clone()),
                    description: entry.description.clone(),
                    source: entry
                        .source
                        .as_deref()
                        .and_then(DescriptionSource::parse)
                        .unwrap_or(DescriptionSource::Human),
                    created_by: entry.created_by.clone(),
                    ai_model: entry.ai_model.clone(),
                    confidence_score: entry.confidence_score,
                    validated_for_content_id: None,
                    created_at: now,
                    updated_at: now,
                };
                queries::descriptions::upsert(&tx, &description)?;
            }
            tx.commit().map_err(write_err)
        })?;

        report.imported = valid.len();
        Ok(report)
    }

    // ── raw access ──────────────────────────────────────────────────────

    /// Raw read access — for operations not yet covered by a store method.
    /// Prefer the typed methods where possible.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, StorageError>,
    {
        self.db.with_reader(f)
    }

    /// Raw write access — for operations not yet covered by a store method.
    /// Prefer the typed methods where possible.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, StorageError>,
    {
        self.db.with_writer(f)
    }

    // ── internals ───────────────────────────────────────────────────────

    fn require_snapshot(&self, id: &SnapshotId) -> Result<(), StorageError> {
        self.get_snapshot(id.as_str()).map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionImportEntry {
    #[serde(default)]
    semantic_id: String,
    #[serde(default)]
    description: String,
    source: Option<String>,
    ai_model: Option<String>,
    confidence_score: Option<f64>,
    created_by: Option<String>,
}

fn write_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::WriteFailed {
        message: e.to_string(),
    }
}

/// Unix milliseconds now.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn new_snapshot(options: SnapshotOptions) -> Snapshot {
    Snapshot {
        id: SnapshotId::mint(),
        created_at: now_ms(),
        label: options.label,
        comment: options.comment,
        git_commit: options.git_commit,
        git_branch: options.git_branch,
        git_tag: options.git_tag,
        project_root: options.project_root,
        config_hash: options.config_hash,
        scope: options.scope.unwrap_or_else(|| "src".to_string()),
        metadata: SnapshotMetadata::default(),
    }
}

/// Insert functions (with children) and source files inside an open
/// transaction, in (file path, start line) order.
fn write_function_rows(
    conn: &rusqlite::Connection,
    snapshot_id: &str,
    functions: &[FunctionRecord],
    source_files: &[SourceFileRecord],
) -> Result<(), StorageError> {
    queries::source_files::insert_batch(conn, snapshot_id, source_files)?;

    let file_refs: FxHashMap<&str, &str> = source_files
        .iter()
        .map(|f| (f.file_path.as_str(), f.id.as_str()))
        .collect();

    let mut ordered: Vec<&FunctionRecord> = functions.iter().collect();
    ordered.sort_by_key(|f| (f.file_path.clone(), f.start_line));

    for record in ordered {
        let source_ref = file_refs.get(record.file_path.as_str()).copied();
        queries::functions::insert(conn, snapshot_id, record, source_ref)?;
    }
    Ok(())
}

/// Recompute snapshot metadata from the persisted rows and promote the
/// analysis level (never demoting).
fn roll_up(
    conn: &rusqlite::Connection,
    snapshot_id: &str,
    phase_level: AnalysisLevel,
) -> Result<SnapshotMetadata, StorageError> {
    let aggregates = queries::functions::aggregates(conn, snapshot_id)?;
    let total_files = queries::source_files::count_by_snapshot(conn, snapshot_id)? as u32;

    let mut distribution = ComplexityDistribution::default();
    for cc in &aggregates.complexities {
        match cc {
            0..=5 => distribution.record("low"),
            6..=10 => distribution.record("moderate"),
            11..=20 => distribution.record("high"),
            _ => distribution.record("very_high"),
        }
    }

    // Never demote a previously reached level.
    let current: Option<Snapshot> = queries::snapshots::get(conn, snapshot_id)?;
    let current_level = current
        .map(|s| s.analysis_level())
        .unwrap_or(AnalysisLevel::None);
    let level = current_level.max(phase_level);

    let mut file_extensions = FxHashMap::default();
    for (ext, count) in aggregates.extensions {
        file_extensions.insert(ext, count);
    }

    Ok(SnapshotMetadata {
        total_functions: aggregates.total_functions,
        total_files,
        avg_complexity: aggregates.avg_complexity,
        max_complexity: aggregates.max_complexity,
        exported_functions: aggregates.exported_functions,
        async_functions: aggregates.async_functions,
        complexity_distribution: distribution,
        file_extensions,
        analysis_level: Some(level),
        basic_analysis_completed: level >= AnalysisLevel::Basic,
        call_graph_analysis_completed: level >= AnalysisLevel::CallGraph,
    })
}
