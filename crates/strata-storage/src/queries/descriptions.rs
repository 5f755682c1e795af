//! function_descriptions table queries.

use rusqlite::{params, Connection, OptionalExtension};
use strata_core::errors::StorageError;
use strata_core::types::{ContentId, DescriptionSource, FunctionDescription, SemanticId};

use super::sqe;

/// Insert or update a description keyed by semantic id.
/// `created_at` is preserved on update.
pub fn upsert(conn: &Connection, description: &FunctionDescription) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO function_descriptions
         (function_semantic_id, description, source, created_by, ai_model,
          confidence_score, validated_for_content_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(function_semantic_id) DO UPDATE SET
            description = excluded.description,
            source = excluded.source,
            created_by = excluded.created_by,
            ai_model = excluded.ai_model,
            confidence_score = excluded.confidence_score,
            validated_for_content_id = excluded.validated_for_content_id,
            updated_at = excluded.updated_at",
    )
    .map_err(sqe)?
    .execute(params![
        description.semantic_id.as_str(),
        description.description,
        description.source.as_str(),
        description.created_by,
        description.ai_model,
        description.confidence_score,
        description
            .validated_for_content_id
            .as_ref()
            .map(|id| id.as_str()),
        description.created_at,
        description.updated_at,
    ])
    .map_err(sqe)?;
    Ok(())
}

/// Fetch the description for a semantic id.
pub fn get(
    conn: &Connection,
    semantic_id: &str,
) -> Result<Option<FunctionDescription>, StorageError> {
    conn.prepare_cached(
        "SELECT function_semantic_id, description, source, created_by,
                ai_model, confidence_score, validated_for_content_id,
                created_at, updated_at
         FROM function_descriptions WHERE function_semantic_id = ?1",
    )
    .map_err(sqe)?
    .query_row(params![semantic_id], |row| {
        let source_text: String = row.get(2)?;
        Ok(FunctionDescription {
            semantic_id: SemanticId::new(row.get::<_, String>(0)?),
            description: row.get(1)?,
            source: DescriptionSource::parse(&source_text).unwrap_or(DescriptionSource::Human),
            created_by: row.get(3)?,
            ai_model: row.get(4)?,
            confidence_score: row.get(5)?,
            validated_for_content_id: row.get::<_, Option<String>>(6)?.map(ContentId::new),
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    })
    .optional()
    .map_err(sqe)
}

/// Count stored descriptions.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM function_descriptions", [], |row| {
        row.get(0)
    })
    .map_err(sqe)
}
