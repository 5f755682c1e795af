//! Schema migrations tracked through `PRAGMA user_version`.

use rusqlite::Connection;
use strata_core::errors::StorageError;

/// Ordered migration batches. `user_version` records how many have run.
const MIGRATIONS: &[&str] = &[V001_INITIAL_SCHEMA];

const V001_INITIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS snapshots (
    id              TEXT PRIMARY KEY,
    created_at      INTEGER NOT NULL,
    label           TEXT,
    comment         TEXT,
    git_commit      TEXT,
    git_branch      TEXT,
    git_tag         TEXT,
    project_root    TEXT NOT NULL,
    config_hash     TEXT NOT NULL,
    scope           TEXT NOT NULL DEFAULT 'src',
    metadata        TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_snapshots_created ON snapshots(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_snapshots_label ON snapshots(label);

CREATE TABLE IF NOT EXISTS functions (
    id                  TEXT PRIMARY KEY,
    semantic_id         TEXT NOT NULL,
    content_id          TEXT NOT NULL,
    snapshot_id         TEXT NOT NULL REFERENCES snapshots(id) ON DELETE CASCADE,
    name                TEXT NOT NULL,
    display_name        TEXT NOT NULL,
    signature           TEXT NOT NULL,
    signature_hash      TEXT NOT NULL,
    return_type         TEXT,
    file_path           TEXT NOT NULL,
    file_hash           TEXT NOT NULL,
    start_line          INTEGER NOT NULL,
    end_line            INTEGER NOT NULL,
    start_column        INTEGER NOT NULL,
    end_column          INTEGER NOT NULL,
    ast_hash            TEXT NOT NULL,
    context_path        TEXT NOT NULL DEFAULT '[]',
    function_type       TEXT NOT NULL,
    nesting_level       INTEGER NOT NULL DEFAULT 0,
    is_exported         INTEGER NOT NULL DEFAULT 0,
    is_async            INTEGER NOT NULL DEFAULT 0,
    is_generator        INTEGER NOT NULL DEFAULT 0,
    is_arrow_function   INTEGER NOT NULL DEFAULT 0,
    is_method           INTEGER NOT NULL DEFAULT 0,
    is_constructor      INTEGER NOT NULL DEFAULT 0,
    is_static           INTEGER NOT NULL DEFAULT 0,
    is_accessor         INTEGER NOT NULL DEFAULT 0,
    access_modifier     TEXT,
    js_doc              TEXT,
    source_code         TEXT,
    source_file_ref_id  TEXT
);
CREATE INDEX IF NOT EXISTS idx_functions_snapshot ON functions(snapshot_id);
CREATE INDEX IF NOT EXISTS idx_functions_semantic ON functions(semantic_id);
CREATE INDEX IF NOT EXISTS idx_functions_location ON functions(snapshot_id, file_path, start_line);

CREATE TABLE IF NOT EXISTS parameters (
    function_id     TEXT NOT NULL REFERENCES functions(id) ON DELETE CASCADE,
    position        INTEGER NOT NULL,
    name            TEXT NOT NULL,
    type            TEXT,
    type_simple     TEXT,
    is_optional     INTEGER NOT NULL DEFAULT 0,
    is_rest         INTEGER NOT NULL DEFAULT 0,
    default_value   TEXT,
    description     TEXT,
    PRIMARY KEY (function_id, position)
);

CREATE TABLE IF NOT EXISTS quality_metrics (
    function_id             TEXT PRIMARY KEY REFERENCES functions(id) ON DELETE CASCADE,
    lines_of_code           INTEGER NOT NULL,
    total_lines             INTEGER NOT NULL,
    comment_lines           INTEGER NOT NULL,
    code_to_comment_ratio   REAL NOT NULL,
    cyclomatic_complexity   INTEGER NOT NULL,
    cognitive_complexity    INTEGER NOT NULL,
    max_nesting_level       INTEGER NOT NULL,
    parameter_count         INTEGER NOT NULL,
    return_statement_count  INTEGER NOT NULL,
    branch_count            INTEGER NOT NULL,
    loop_count              INTEGER NOT NULL,
    try_catch_count         INTEGER NOT NULL,
    async_await_count       INTEGER NOT NULL,
    callback_count          INTEGER NOT NULL,
    halstead_volume         REAL NOT NULL,
    halstead_difficulty     REAL NOT NULL,
    maintainability_index   REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS call_edges (
    id                  TEXT PRIMARY KEY,
    snapshot_id         TEXT NOT NULL REFERENCES snapshots(id) ON DELETE CASCADE,
    caller_function_id  TEXT NOT NULL REFERENCES functions(id) ON DELETE CASCADE,
    callee_function_id  TEXT,
    callee_name         TEXT NOT NULL,
    callee_signature    TEXT,
    caller_class_name   TEXT,
    callee_class_name   TEXT,
    call_type           TEXT NOT NULL,
    call_context        TEXT,
    line_number         INTEGER NOT NULL,
    column_number       INTEGER NOT NULL,
    is_async            INTEGER NOT NULL DEFAULT 0,
    is_chained          INTEGER NOT NULL DEFAULT 0,
    confidence_score    REAL NOT NULL,
    metadata            TEXT NOT NULL DEFAULT '{}',
    created_at          INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_call_edges_caller ON call_edges(snapshot_id, caller_function_id);
CREATE INDEX IF NOT EXISTS idx_call_edges_callee ON call_edges(snapshot_id, callee_function_id);

CREATE TABLE IF NOT EXISTS source_files (
    id                  TEXT PRIMARY KEY,
    snapshot_id         TEXT NOT NULL REFERENCES snapshots(id) ON DELETE CASCADE,
    file_path           TEXT NOT NULL,
    file_content        TEXT NOT NULL,
    file_hash           TEXT NOT NULL,
    encoding            TEXT NOT NULL DEFAULT 'utf-8',
    file_size_bytes     INTEGER NOT NULL,
    line_count          INTEGER NOT NULL,
    language            TEXT NOT NULL,
    function_count      INTEGER NOT NULL DEFAULT 0,
    export_count        INTEGER NOT NULL DEFAULT 0,
    import_count        INTEGER NOT NULL DEFAULT 0,
    file_modified_time  INTEGER
);
CREATE INDEX IF NOT EXISTS idx_source_files_snapshot ON source_files(snapshot_id);

CREATE TABLE IF NOT EXISTS lineages (
    id          TEXT PRIMARY KEY,
    from_ids    TEXT NOT NULL,
    to_ids      TEXT NOT NULL,
    kind        TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'draft',
    confidence  REAL NOT NULL,
    note        TEXT,
    git_commit  TEXT,
    created_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS function_descriptions (
    function_semantic_id        TEXT PRIMARY KEY,
    description                 TEXT NOT NULL,
    source                      TEXT NOT NULL DEFAULT 'human',
    created_by                  TEXT,
    ai_model                    TEXT,
    confidence_score            REAL,
    validated_for_content_id    TEXT,
    created_at                  INTEGER NOT NULL,
    updated_at                  INTEGER NOT NULL
);
"#;

/// Apply all pending migrations.
pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    let current: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    for (idx, ddl) in MIGRATIONS.iter().enumerate() {
        let version = idx as u32 + 1;
        if version <= current {
            continue;
        }
        conn.execute_batch(ddl)
            .map_err(|e| StorageError::MigrationFailed {
                version,
                message: e.to_string(),
            })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| StorageError::MigrationFailed {
                version,
                message: e.to_string(),
            })?;
        tracing::debug!(version, "schema migration applied");
    }

    Ok(())
}

/// Current schema version.
pub fn schema_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
