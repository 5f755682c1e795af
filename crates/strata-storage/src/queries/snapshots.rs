//! snapshots table queries.

use rusqlite::{params, Connection, OptionalExtension};
use strata_core::types::{Snapshot, SnapshotId, SnapshotMetadata};

use super::sqe;
use strata_core::errors::StorageError;

/// Insert a snapshot header.
pub fn insert(conn: &Connection, snapshot: &Snapshot) -> Result<(), StorageError> {
    let metadata = serde_json::to_string(&snapshot.metadata).map_err(sqe)?;
    conn.prepare_cached(
        "INSERT INTO snapshots
         (id, created_at, label, comment, git_commit, git_branch, git_tag,
          project_root, config_hash, scope, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .map_err(sqe)?
    .execute(params![
        snapshot.id.as_str(),
        snapshot.created_at,
        snapshot.label,
        snapshot.comment,
        snapshot.git_commit,
        snapshot.git_branch,
        snapshot.git_tag,
        snapshot.project_root,
        snapshot.config_hash,
        snapshot.scope,
        metadata,
    ])
    .map_err(sqe)?;
    Ok(())
}

/// Replace the rolled-up metadata of a snapshot.
pub fn update_metadata(
    conn: &Connection,
    id: &SnapshotId,
    metadata: &SnapshotMetadata,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(metadata).map_err(sqe)?;
    conn.execute(
        "UPDATE snapshots SET metadata = ?1 WHERE id = ?2",
        params![json, id.as_str()],
    )
    .map_err(sqe)?;
    Ok(())
}

/// Fetch one snapshot by exact id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Snapshot>, StorageError> {
    conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
        .map_err(sqe)?
        .query_row(params![id], map_snapshot_row)
        .optional()
        .map_err(sqe)
}

/// All snapshots whose id starts with the given prefix.
pub fn find_by_id_prefix(conn: &Connection, prefix: &str) -> Result<Vec<Snapshot>, StorageError> {
    let like = format!("{}%", prefix.replace('%', "").replace('_', ""));
    let mut stmt = conn
        .prepare_cached(&format!(
            "{SELECT_COLUMNS} WHERE id LIKE ?1 ORDER BY created_at DESC"
        ))
        .map_err(sqe)?;
    let rows = stmt.query_map(params![like], map_snapshot_row).map_err(sqe)?;
    collect(rows)
}

/// All snapshots carrying the given label.
pub fn find_by_label(conn: &Connection, label: &str) -> Result<Vec<Snapshot>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "{SELECT_COLUMNS} WHERE label = ?1 ORDER BY created_at DESC"
        ))
        .map_err(sqe)?;
    let rows = stmt.query_map(params![label], map_snapshot_row).map_err(sqe)?;
    collect(rows)
}

/// The snapshot with the given git commit, when one exists.
pub fn find_by_git_commit(
    conn: &Connection,
    commit: &str,
) -> Result<Option<Snapshot>, StorageError> {
    conn.prepare_cached(&format!(
        "{SELECT_COLUMNS} WHERE git_commit = ?1 ORDER BY created_at DESC LIMIT 1"
    ))
    .map_err(sqe)?
    .query_row(params![commit], map_snapshot_row)
    .optional()
    .map_err(sqe)
}

/// Snapshot headers, most-recent-first, with optional scope filter.
pub fn list(
    conn: &Connection,
    scope: Option<&str>,
    limit: usize,
    offset: usize,
) -> Result<Vec<Snapshot>, StorageError> {
    let rows = match scope {
        Some(scope) => {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "{SELECT_COLUMNS} WHERE scope = ?1
                     ORDER BY created_at DESC, id LIMIT ?2 OFFSET ?3"
                ))
                .map_err(sqe)?;
            let rows = stmt
                .query_map(params![scope, limit as i64, offset as i64], map_snapshot_row)
                .map_err(sqe)?;
            collect(rows)?
        }
        None => {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "{SELECT_COLUMNS} ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2"
                ))
                .map_err(sqe)?;
            let rows = stmt
                .query_map(params![limit as i64, offset as i64], map_snapshot_row)
                .map_err(sqe)?;
            collect(rows)?
        }
    };
    Ok(rows)
}

/// Delete a snapshot; child rows cascade.
pub fn delete(conn: &Connection, id: &str) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM snapshots WHERE id = ?1", params![id])
        .map_err(sqe)
}

/// Count all snapshots.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))
        .map_err(sqe)
}

const SELECT_COLUMNS: &str = "SELECT id, created_at, label, comment, git_commit, git_branch,
        git_tag, project_root, config_hash, scope, metadata FROM snapshots";

fn map_snapshot_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snapshot> {
    let metadata_json: String = row.get(10)?;
    let metadata: SnapshotMetadata = serde_json::from_str(&metadata_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(10, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Snapshot {
        id: SnapshotId::new(row.get::<_, String>(0)?),
        created_at: row.get(1)?,
        label: row.get(2)?,
        comment: row.get(3)?,
        git_commit: row.get(4)?,
        git_branch: row.get(5)?,
        git_tag: row.get(6)?,
        project_root: row.get(7)?,
        config_hash: row.get(8)?,
        scope: row.get(9)?,
        metadata,
    })
}

fn collect(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<Snapshot>>,
) -> Result<Vec<Snapshot>, StorageError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqe)?);
    }
    Ok(result)
}
