//! Function query filters: a typed, whitelisted subset of SQL predicates.

use strata_core::errors::StorageError;

/// Comparison operators accepted by `query_functions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    In,
}

impl FilterOp {
    fn sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
        }
    }
}

/// A filter value; lists are only valid with `FilterOp::In`.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
}

/// One predicate over a whitelisted field.
#[derive(Debug, Clone)]
pub struct FunctionFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// A full function query: predicates, keyword search, sort, paging.
#[derive(Debug, Clone, Default)]
pub struct FunctionQuery {
    pub filters: Vec<FunctionFilter>,
    /// Matches name, display name, JSDoc, or source text.
    pub keyword: Option<String>,
    /// Whitelisted sort field; defaults to file/line order.
    pub sort: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Map a public field name to its SQL column. Only whitelisted names are
/// accepted; anything else is a read error, never raw SQL.
fn column_for(field: &str) -> Option<&'static str> {
    Some(match field {
        "name" => "f.name",
        "display_name" => "f.display_name",
        "file_path" => "f.file_path",
        "function_type" => "f.function_type",
        "is_exported" => "f.is_exported",
        "is_async" => "f.is_async",
        "is_method" => "f.is_method",
        "nesting_level" => "f.nesting_level",
        "start_line" => "f.start_line",
        "lines_of_code" => "m.lines_of_code",
        "cyclomatic_complexity" => "m.cyclomatic_complexity",
        "cognitive_complexity" => "m.cognitive_complexity",
        "max_nesting_level" => "m.max_nesting_level",
        "parameter_count" => "m.parameter_count",
        "maintainability_index" => "m.maintainability_index",
        _ => return None,
    })
}

/// Built predicate text plus its bound parameters.
pub(crate) struct BuiltQuery {
    pub where_sql: String,
    pub order_sql: String,
    pub params: Vec<Box<dyn rusqlite::types::ToSql>>,
}

pub(crate) fn build(query: &FunctionQuery) -> Result<BuiltQuery, StorageError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    for filter in &query.filters {
        let column = column_for(&filter.field).ok_or_else(|| StorageError::ReadFailed {
            message: format!("unknown filter field '{}'", filter.field),
        })?;

        match (&filter.op, &filter.value) {
            (FilterOp::In, FilterValue::List(values)) => {
                if values.is_empty() {
                    clauses.push("0".to_string());
                    continue;
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                clauses.push(format!("{column} IN ({placeholders})"));
                for v in values {
                    params.push(Box::new(v.clone()));
                }
            }
            (FilterOp::In, _) => {
                return Err(StorageError::ReadFailed {
                    message: "IN filters require a list value".to_string(),
                })
            }
            (op, FilterValue::Text(v)) => {
                clauses.push(format!("{column} {} ?", op.sql()));
                params.push(Box::new(v.clone()));
            }
            (op, FilterValue::Number(v)) => {
                clauses.push(format!("{column} {} ?", op.sql()));
                params.push(Box::new(*v));
            }
            (op, FilterValue::Bool(v)) => {
                clauses.push(format!("{column} {} ?", op.sql()));
                params.push(Box::new(*v as i64));
            }
            (_, FilterValue::List(_)) => {
                return Err(StorageError::ReadFailed {
                    message: "list values are only valid with IN".to_string(),
                })
            }
        }
    }

    if let Some(keyword) = &query.keyword {
        let like = format!("%{keyword}%");
        clauses.push(
            "(f.name LIKE ? OR f.display_name LIKE ? OR f.js_doc LIKE ? OR f.source_code LIKE ?)"
                .to_string(),
        );
        for _ in 0..4 {
            params.push(Box::new(like.clone()));
        }
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" AND {}", clauses.join(" AND "))
    };

    // Stable order: requested key first, then (file_path, start_line).
    let order_sql = match &query.sort {
        Some(field) => {
            let column = column_for(field).ok_or_else(|| StorageError::ReadFailed {
                message: format!("unknown sort field '{field}'"),
            })?;
            let direction = if query.descending { "DESC" } else { "ASC" };
            format!("ORDER BY {column} {direction}, f.file_path, f.start_line")
        }
        None => "ORDER BY f.file_path, f.start_line".to_string(),
    };

    Ok(BuiltQuery {
        where_sql,
        order_sql,
        params,
    })
}
