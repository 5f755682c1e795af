//! source_files table queries.

use rusqlite::{params, Connection};
use strata_core::errors::StorageError;
use strata_core::types::SourceFileRecord;

use super::sqe;

/// Insert a batch of source-file blobs. Runs inside the caller's transaction.
pub fn insert_batch(
    conn: &Connection,
    snapshot_id: &str,
    files: &[SourceFileRecord],
) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO source_files
             (id, snapshot_id, file_path, file_content, file_hash, encoding,
              file_size_bytes, line_count, language, function_count,
              export_count, import_count, file_modified_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .map_err(sqe)?;

    let mut count = 0;
    for file in files {
        stmt.execute(params![
            file.id,
            snapshot_id,
            file.file_path,
            file.content,
            file.file_hash,
            file.encoding,
            file.file_size_bytes,
            file.line_count,
            file.language,
            file.function_count,
            file.export_count,
            file.import_count,
            file.file_modified_time,
        ])
        .map_err(sqe)?;
        count += 1;
    }
    Ok(count)
}

/// All source files of a snapshot, path-ordered.
pub fn load_by_snapshot(
    conn: &Connection,
    snapshot_id: &str,
) -> Result<Vec<SourceFileRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, file_path, file_content, file_hash, encoding,
                    file_size_bytes, line_count, language, function_count,
                    export_count, import_count, file_modified_time
             FROM source_files WHERE snapshot_id = ?1 ORDER BY file_path",
        )
        .map_err(sqe)?;

    let rows = stmt
        .query_map(params![snapshot_id], |row| {
            Ok(SourceFileRecord {
                id: row.get(0)?,
                file_path: row.get(1)?,
                content: row.get(2)?,
                file_hash: row.get(3)?,
                encoding: row.get(4)?,
                file_size_bytes: row.get(5)?,
                line_count: row.get(6)?,
                language: row.get(7)?,
                function_count: row.get(8)?,
                export_count: row.get(9)?,
                import_count: row.get(10)?,
                file_modified_time: row.get(11)?,
            })
        })
        .map_err(sqe)?;

    let mut files = Vec::new();
    for row in rows {
        files.push(row.map_err(sqe)?);
    }
    Ok(files)
}

/// Count source files in a snapshot.
pub fn count_by_snapshot(conn: &Connection, snapshot_id: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM source_files WHERE snapshot_id = ?1",
        params![snapshot_id],
        |row| row.get(0),
    )
    .map_err(sqe)
}
