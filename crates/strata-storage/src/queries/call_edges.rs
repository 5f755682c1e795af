//! call_edges table queries.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;
use strata_core::types::{CallEdge, CallEdgeMetadata, CallType, PhysicalId};

use super::sqe;

/// Insert a batch of call edges. Runs inside the caller's transaction.
pub fn insert_batch(
    conn: &Connection,
    snapshot_id: &str,
    edges: &[CallEdge],
    created_at: i64,
) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO call_edges
             (id, snapshot_id, caller_function_id, callee_function_id,
              callee_name, callee_signature, caller_class_name,
              callee_class_name, call_type, call_context, line_number,
              column_number, is_async, is_chained, confidence_score,
              metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17)",
        )
        .map_err(sqe)?;

    let mut count = 0;
    for edge in edges {
        let metadata = serde_json::to_string(&edge.metadata).map_err(sqe)?;
        stmt.execute(params![
            edge.id,
            snapshot_id,
            edge.caller_function_id.as_str(),
            edge.callee_function_id.as_ref().map(|id| id.as_str()),
            edge.callee_name,
            edge.callee_signature,
            edge.caller_class_name,
            edge.callee_class_name,
            edge.call_type.as_str(),
            edge.call_context,
            edge.line_number,
            edge.column_number,
            edge.is_async as i64,
            edge.is_chained as i64,
            edge.confidence_score,
            metadata,
            created_at,
        ])
        .map_err(sqe)?;
        count += 1;
    }
    Ok(count)
}

/// All edges of a snapshot in (caller, line) order.
pub fn load_by_snapshot(
    conn: &Connection,
    snapshot_id: &str,
) -> Result<Vec<CallEdge>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, caller_function_id, callee_function_id, callee_name,
                    callee_signature, caller_class_name, callee_class_name,
                    call_type, call_context, line_number, column_number,
                    is_async, is_chained, confidence_score, metadata
             FROM call_edges WHERE snapshot_id = ?1
             ORDER BY caller_function_id, line_number",
        )
        .map_err(sqe)?;

    let rows = stmt
        .query_map(params![snapshot_id], |row| {
            let call_type_text: String = row.get(7)?;
            let metadata_json: String = row.get(14)?;
            let metadata: CallEdgeMetadata =
                serde_json::from_str(&metadata_json).unwrap_or_default();
            Ok(CallEdge {
                id: row.get(0)?,
                caller_function_id: PhysicalId::new(row.get::<_, String>(1)?),
                callee_function_id: row
                    .get::<_, Option<String>>(2)?
                    .map(PhysicalId::new),
                callee_name: row.get(3)?,
                callee_signature: row.get(4)?,
                caller_class_name: row.get(5)?,
                callee_class_name: row.get(6)?,
                call_type: CallType::parse(&call_type_text).unwrap_or(CallType::Dynamic),
                call_context: row.get(8)?,
                line_number: row.get(9)?,
                column_number: row.get(10)?,
                is_async: row.get::<_, i64>(11)? != 0,
                is_chained: row.get::<_, i64>(12)? != 0,
                confidence_score: row.get(13)?,
                metadata,
            })
        })
        .map_err(sqe)?;

    let mut edges = Vec::new();
    for row in rows {
        edges.push(row.map_err(sqe)?);
    }
    Ok(edges)
}

/// Count edges in a snapshot.
pub fn count_by_snapshot(conn: &Connection, snapshot_id: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM call_edges WHERE snapshot_id = ?1",
        params![snapshot_id],
        |row| row.get(0),
    )
    .map_err(sqe)
}
