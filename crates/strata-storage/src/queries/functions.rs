//! functions, parameters, and quality_metrics table queries.

use rusqlite::{params, Connection};
use smallvec::SmallVec;
use strata_core::errors::StorageError;
use strata_core::types::collections::FxHashMap;
use strata_core::types::{
    AccessModifier, ContentId, FunctionKind, FunctionRecord, Parameter, PhysicalId,
    QualityMetrics, SemanticId,
};

use super::filter::{self, FunctionQuery};
use super::sqe;

/// Insert one function with its parameters and metrics.
/// Runs inside the caller's transaction.
pub fn insert(
    conn: &Connection,
    snapshot_id: &str,
    record: &FunctionRecord,
    source_file_ref_id: Option<&str>,
) -> Result<(), StorageError> {
    let context_path = serde_json::to_string(&record.context_path.to_vec()).map_err(sqe)?;

    conn.prepare_cached(
        "INSERT INTO functions
         (id, semantic_id, content_id, snapshot_id, name, display_name,
          signature, signature_hash, return_type, file_path, file_hash,
          start_line, end_line, start_column, end_column, ast_hash,
          context_path, function_type, nesting_level, is_exported, is_async,
          is_generator, is_arrow_function, is_method, is_constructor,
          is_static, is_accessor, access_modifier, js_doc, source_code,
          source_file_ref_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                 ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26,
                 ?27, ?28, ?29, ?30, ?31)",
    )
    .map_err(sqe)?
    .execute(params![
        record.physical_id.as_str(),
        record.semantic_id.as_str(),
        record.content_id.as_str(),
        snapshot_id,
        record.name,
        record.display_name,
        record.signature,
        record.signature_hash,
        record.return_type,
        record.file_path,
        record.file_hash,
        record.start_line,
        record.end_line,
        record.start_column,
        record.end_column,
        record.ast_hash,
        context_path,
        record.kind.as_str(),
        record.nesting_level,
        record.is_exported as i64,
        record.is_async as i64,
        record.is_generator as i64,
        record.is_arrow as i64,
        record.is_method as i64,
        record.is_constructor as i64,
        record.is_static as i64,
        record.is_accessor as i64,
        record.access_modifier.map(|a| a.as_str()),
        record.js_doc,
        record.source_code,
        source_file_ref_id,
    ])
    .map_err(sqe)?;

    let mut param_stmt = conn
        .prepare_cached(
            "INSERT INTO parameters
             (function_id, position, name, type, type_simple, is_optional,
              is_rest, default_value, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(sqe)?;
    for p in &record.parameters {
        param_stmt
            .execute(params![
                record.physical_id.as_str(),
                p.position,
                p.name,
                p.type_text,
                p.type_simple,
                p.is_optional as i64,
                p.is_rest as i64,
                p.default_value,
                p.description,
            ])
            .map_err(sqe)?;
    }

    if let Some(m) = &record.metrics {
        conn.prepare_cached(
            "INSERT INTO quality_metrics
             (function_id, lines_of_code, total_lines, comment_lines,
              code_to_comment_ratio, cyclomatic_complexity,
              cognitive_complexity, max_nesting_level, parameter_count,
              return_statement_count, branch_count, loop_count,
              try_catch_count, async_await_count, callback_count,
              halstead_volume, halstead_difficulty, maintainability_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18)",
        )
        .map_err(sqe)?
        .execute(params![
            record.physical_id.as_str(),
            m.lines_of_code,
            m.total_lines,
            m.comment_lines,
            m.code_to_comment_ratio,
            m.cyclomatic_complexity,
            m.cognitive_complexity,
            m.max_nesting_level,
            m.parameter_count,
            m.return_statement_count,
            m.branch_count,
            m.loop_count,
            m.try_catch_count,
            m.async_await_count,
            m.callback_count,
            m.halstead_volume,
            m.halstead_difficulty,
            m.maintainability_index,
        ])
        .map_err(sqe)?;
    }

    Ok(())
}

const FUNCTION_COLUMNS: &str = "f.id, f.semantic_id, f.content_id, f.name, f.display_name,
    f.signature, f.signature_hash, f.return_type, f.file_path, f.file_hash,
    f.start_line, f.end_line, f.start_column, f.end_column, f.ast_hash,
    f.context_path, f.function_type, f.nesting_level, f.is_exported,
    f.is_async, f.is_generator, f.is_arrow_function, f.is_method,
    f.is_constructor, f.is_static, f.is_accessor, f.access_modifier, f.js_doc,
    f.source_code";

/// All functions of a snapshot in (file_path, start_line) order, with
/// parameters and metrics attached.
pub fn load_by_snapshot(
    conn: &Connection,
    snapshot_id: &str,
) -> Result<Vec<FunctionRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {FUNCTION_COLUMNS} FROM functions f
             WHERE f.snapshot_id = ?1
             ORDER BY f.file_path, f.start_line"
        ))
        .map_err(sqe)?;

    let rows = stmt
        .query_map(params![snapshot_id], map_function_row)
        .map_err(sqe)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row.map_err(sqe)?);
    }

    attach_children(conn, snapshot_id, &mut records)?;
    Ok(records)
}

/// Filtered, sorted, paged function query over one snapshot.
pub fn query(
    conn: &Connection,
    snapshot_id: &str,
    query: &FunctionQuery,
) -> Result<Vec<FunctionRecord>, StorageError> {
    let built = filter::build(query)?;
    let limit = query.limit.map(|l| l as i64).unwrap_or(-1);
    let offset = query.offset.unwrap_or(0) as i64;

    let sql = format!(
        "SELECT {FUNCTION_COLUMNS} FROM functions f
         LEFT JOIN quality_metrics m ON m.function_id = f.id
         WHERE f.snapshot_id = ?{}
         {} LIMIT ? OFFSET ?",
        built.where_sql, built.order_sql
    );

    let mut stmt = conn.prepare(&sql).map_err(sqe)?;

    let mut bound: Vec<&dyn rusqlite::types::ToSql> = Vec::with_capacity(built.params.len() + 3);
    let snapshot_param = snapshot_id.to_string();
    bound.push(&snapshot_param);
    for p in &built.params {
        bound.push(p.as_ref());
    }
    bound.push(&limit);
    bound.push(&offset);

    let rows = stmt
        .query_map(bound.as_slice(), map_function_row)
        .map_err(sqe)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row.map_err(sqe)?);
    }

    attach_children(conn, snapshot_id, &mut records)?;
    Ok(records)
}

/// Count functions in a snapshot.
pub fn count_by_snapshot(conn: &Connection, snapshot_id: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM functions WHERE snapshot_id = ?1",
        params![snapshot_id],
        |row| row.get(0),
    )
    .map_err(sqe)
}

/// Load parameters and metrics for a snapshot and attach them in place.
fn attach_children(
    conn: &Connection,
    snapshot_id: &str,
    records: &mut [FunctionRecord],
) -> Result<(), StorageError> {
    let mut by_id: FxHashMap<String, usize> = FxHashMap::default();
    for (idx, record) in records.iter().enumerate() {
        by_id.insert(record.physical_id.as_str().to_string(), idx);
    }

    let mut param_stmt = conn
        .prepare_cached(
            "SELECT p.function_id, p.position, p.name, p.type, p.type_simple,
                    p.is_optional, p.is_rest, p.default_value, p.description
             FROM parameters p
             JOIN functions f ON f.id = p.function_id
             WHERE f.snapshot_id = ?1
             ORDER BY p.function_id, p.position",
        )
        .map_err(sqe)?;
    let param_rows = param_stmt
        .query_map(params![snapshot_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                Parameter {
                    position: row.get(1)?,
                    name: row.get(2)?,
                    type_text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    type_simple: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    is_optional: row.get::<_, i64>(5)? != 0,
                    is_rest: row.get::<_, i64>(6)? != 0,
                    default_value: row.get(7)?,
                    description: row.get(8)?,
                },
            ))
        })
        .map_err(sqe)?;
    for row in param_rows {
        let (function_id, parameter) = row.map_err(sqe)?;
        if let Some(&idx) = by_id.get(&function_id) {
            records[idx].parameters.push(parameter);
        }
    }

    let mut metric_stmt = conn
        .prepare_cached(
            "SELECT m.function_id, m.lines_of_code, m.total_lines,
                    m.comment_lines, m.code_to_comment_ratio,
                    m.cyclomatic_complexity, m.cognitive_complexity,
                    m.max_nesting_level, m.parameter_count,
                    m.return_statement_count, m.branch_count, m.loop_count,
                    m.try_catch_count, m.async_await_count, m.callback_count,
                    m.halstead_volume, m.halstead_difficulty,
                    m.maintainability_index
             FROM quality_metrics m
             JOIN functions f ON f.id = m.function_id
             WHERE f.snapshot_id = ?1",
        )
        .map_err(sqe)?;
    let metric_rows = metric_stmt
        .query_map(params![snapshot_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                QualityMetrics {
                    lines_of_code: row.get(1)?,
                    total_lines: row.get(2)?,
                    comment_lines: row.get(3)?,
                    code_to_comment_ratio: row.get(4)?,
                    cyclomatic_complexity: row.get(5)?,
                    cognitive_complexity: row.get(6)?,
                    max_nesting_level: row.get(7)?,
                    parameter_count: row.get(8)?,
                    return_statement_count: row.get(9)?,
                    branch_count: row.get(10)?,
                    loop_count: row.get(11)?,
                    try_catch_count: row.get(12)?,
                    async_await_count: row.get(13)?,
                    callback_count: row.get(14)?,
                    halstead_volume: row.get(15)?,
                    halstead_difficulty: row.get(16)?,
                    maintainability_index: row.get(17)?,
                },
            ))
        })
        .map_err(sqe)?;
    for row in metric_rows {
        let (function_id, metrics) = row.map_err(sqe)?;
        if let Some(&idx) = by_id.get(&function_id) {
            records[idx].metrics = Some(metrics);
        }
    }

    Ok(())
}

fn map_function_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FunctionRecord> {
    let context_json: String = row.get(15)?;
    let context: Vec<String> = serde_json::from_str(&context_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(15, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let kind_text: String = row.get(16)?;
    let kind = FunctionKind::parse(&kind_text).unwrap_or(FunctionKind::Declaration);
    let access: Option<String> = row.get(26)?;

    Ok(FunctionRecord {
        physical_id: PhysicalId::new(row.get::<_, String>(0)?),
        semantic_id: SemanticId::new(row.get::<_, String>(1)?),
        content_id: ContentId::new(row.get::<_, String>(2)?),
        name: row.get(3)?,
        display_name: row.get(4)?,
        signature: row.get(5)?,
        signature_hash: row.get(6)?,
        return_type: row.get(7)?,
        file_path: row.get(8)?,
        file_hash: row.get(9)?,
        start_line: row.get(10)?,
        end_line: row.get(11)?,
        start_column: row.get(12)?,
        end_column: row.get(13)?,
        ast_hash: row.get(14)?,
        context_path: SmallVec::from_vec(context),
        kind,
        nesting_level: row.get(17)?,
        is_exported: row.get::<_, i64>(18)? != 0,
        is_async: row.get::<_, i64>(19)? != 0,
        is_generator: row.get::<_, i64>(20)? != 0,
        is_arrow: row.get::<_, i64>(21)? != 0,
        is_method: row.get::<_, i64>(22)? != 0,
        is_constructor: row.get::<_, i64>(23)? != 0,
        is_static: row.get::<_, i64>(24)? != 0,
        is_accessor: row.get::<_, i64>(25)? != 0,
        access_modifier: access.as_deref().and_then(AccessModifier::parse),
        js_doc: row.get(27)?,
        source_code: row.get(28)?,
        parameters: Vec::new(),
        metrics: None,
    })
}

/// Aggregate roll-up inputs for snapshot metadata, computed over the
/// persisted rows.
pub struct FunctionAggregates {
    pub total_functions: u32,
    pub exported_functions: u32,
    pub async_functions: u32,
    pub avg_complexity: f64,
    pub max_complexity: u32,
    pub complexities: Vec<u32>,
    pub extensions: Vec<(String, u32)>,
}

pub fn aggregates(conn: &Connection, snapshot_id: &str) -> Result<FunctionAggregates, StorageError> {
    let (total, exported, asyncs): (i64, i64, i64) = conn
        .query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_exported), 0),
                    COALESCE(SUM(is_async), 0)
             FROM functions WHERE snapshot_id = ?1",
            params![snapshot_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .map_err(sqe)?;

    let mut stmt = conn
        .prepare_cached(
            "SELECT m.cyclomatic_complexity FROM quality_metrics m
             JOIN functions f ON f.id = m.function_id
             WHERE f.snapshot_id = ?1",
        )
        .map_err(sqe)?;
    let rows = stmt
        .query_map(params![snapshot_id], |row| row.get::<_, u32>(0))
        .map_err(sqe)?;
    let mut complexities = Vec::new();
    for row in rows {
        complexities.push(row.map_err(sqe)?);
    }

    let avg_complexity = if complexities.is_empty() {
        0.0
    } else {
        complexities.iter().map(|&c| c as f64).sum::<f64>() / complexities.len() as f64
    };
    let max_complexity = complexities.iter().copied().max().unwrap_or(0);

    let mut ext_stmt = conn
        .prepare_cached("SELECT DISTINCT file_path FROM functions WHERE snapshot_id = ?1")
        .map_err(sqe)?;
    let ext_rows = ext_stmt
        .query_map(params![snapshot_id], |row| row.get::<_, String>(0))
        .map_err(sqe)?;
    let mut extension_counts: FxHashMap<String, u32> = FxHashMap::default();
    for row in ext_rows {
        let path = row.map_err(sqe)?;
        if let Some((_, ext)) = path.rsplit_once('.') {
            *extension_counts.entry(ext.to_lowercase()).or_insert(0) += 1;
        }
    }
    let extensions: Vec<(String, u32)> = extension_counts.into_iter().collect();

    Ok(FunctionAggregates {
        total_functions: total as u32,
        exported_functions: exported as u32,
        async_functions: asyncs as u32,
        avg_complexity,
        max_complexity,
        complexities,
        extensions,
    })
}
