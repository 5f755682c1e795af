//! lineages table queries.

use rusqlite::{params, Connection, OptionalExtension};
use strata_core::errors::StorageError;
use strata_core::types::{Lineage, LineageKind, LineageStatus, PhysicalId};

use super::sqe;

/// Insert one lineage row.
pub fn insert(conn: &Connection, lineage: &Lineage) -> Result<(), StorageError> {
    let from_ids = serde_json::to_string(&lineage.from_ids).map_err(sqe)?;
    let to_ids = serde_json::to_string(&lineage.to_ids).map_err(sqe)?;
    conn.prepare_cached(
        "INSERT INTO lineages
         (id, from_ids, to_ids, kind, status, confidence, note, git_commit, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .map_err(sqe)?
    .execute(params![
        lineage.id,
        from_ids,
        to_ids,
        lineage.kind.as_str(),
        lineage.status.as_str(),
        lineage.confidence,
        lineage.note,
        lineage.git_commit,
        lineage.created_at,
    ])
    .map_err(sqe)?;
    Ok(())
}

/// Fetch one lineage by id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Lineage>, StorageError> {
    conn.prepare_cached(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
        .map_err(sqe)?
        .query_row(params![id], map_lineage_row)
        .optional()
        .map_err(sqe)
}

/// List lineages, optionally by status, highest confidence first.
pub fn list(
    conn: &Connection,
    status: Option<LineageStatus>,
) -> Result<Vec<Lineage>, StorageError> {
    let rows = match status {
        Some(status) => {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "{SELECT_COLUMNS} WHERE status = ?1 ORDER BY confidence DESC, id"
                ))
                .map_err(sqe)?;
            let rows = stmt
                .query_map(params![status.as_str()], map_lineage_row)
                .map_err(sqe)?;
            collect(rows)?
        }
        None => {
            let mut stmt = conn
                .prepare_cached(&format!("{SELECT_COLUMNS} ORDER BY confidence DESC, id"))
                .map_err(sqe)?;
            let rows = stmt.query_map([], map_lineage_row).map_err(sqe)?;
            collect(rows)?
        }
    };
    Ok(rows)
}

/// Promote or demote a draft.
pub fn update_status(
    conn: &Connection,
    id: &str,
    status: LineageStatus,
) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE lineages SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )
    .map_err(sqe)
}

/// Count all lineages.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM lineages", [], |row| row.get(0))
        .map_err(sqe)
}

const SELECT_COLUMNS: &str = "SELECT id, from_ids, to_ids, kind, status, confidence, note,
        git_commit, created_at FROM lineages";

fn map_lineage_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lineage> {
    let from_json: String = row.get(1)?;
    let to_json: String = row.get(2)?;
    let from_ids: Vec<PhysicalId> = serde_json::from_str(&from_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let to_ids: Vec<PhysicalId> = serde_json::from_str(&to_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let kind_text: String = row.get(3)?;
    let status_text: String = row.get(4)?;
    Ok(Lineage {
        id: row.get(0)?,
        from_ids,
        to_ids,
        kind: LineageKind::parse(&kind_text).unwrap_or(LineageKind::Rename),
        status: LineageStatus::parse(&status_text).unwrap_or(LineageStatus::Draft),
        confidence: row.get(5)?,
        note: row.get(6)?,
        git_commit: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn collect(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<Lineage>>,
) -> Result<Vec<Lineage>, StorageError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqe)?);
    }
    Ok(result)
}
