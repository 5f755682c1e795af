//! Database connections: one serialized writer plus a read connection.
//!
//! All reads go through `with_reader()`, all writes through `with_writer()`.
//! No code outside this crate should touch a raw `Connection`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use strata_core::errors::StorageError;

use crate::migrations;

fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// Owns the database connections and runs migrations on open.
pub struct DatabaseManager {
    writer: Mutex<Connection>,
    /// Separate read connection for file-backed databases. In-memory
    /// databases are private per connection, so reads route to the writer.
    reader: Option<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a file-backed database, applying pragmas and migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(sqe)?;
        apply_pragmas(&writer)?;
        migrations::migrate(&writer)?;

        let reader = Connection::open(path).map_err(sqe)?;
        reader
            .pragma_update(None, "query_only", true)
            .map_err(sqe)?;

        Ok(Self {
            writer: Mutex::new(writer),
            reader: Some(Mutex::new(reader)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(sqe)?;
        apply_pragmas(&writer)?;
        migrations::migrate(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            reader: None,
            path: None,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a closure against a read connection.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        match &self.reader {
            Some(reader) => {
                let conn = reader.lock().map_err(|_| StorageError::ReadFailed {
                    message: "reader lock poisoned".to_string(),
                })?;
                f(&conn)
            }
            None => self.with_writer(f),
        }
    }

    /// Run a closure against the single write connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.writer.lock().map_err(|_| StorageError::WriteFailed {
            message: "writer lock poisoned".to_string(),
        })?;
        f(&conn)
    }
}

fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.pragma_update(None, "journal_mode", "WAL").map_err(sqe)?;
    conn.pragma_update(None, "synchronous", "NORMAL").map_err(sqe)?;
    conn.pragma_update(None, "foreign_keys", true).map_err(sqe)?;
    conn.pragma_update(None, "busy_timeout", 5_000).map_err(sqe)?;
    Ok(())
}
