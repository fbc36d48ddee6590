//! The SQLite file behind persisted collections.
//!
//! One database holds any number of named collections: a `collections` row
//! per name recording its fixed dimensionality, and a `records` row per
//! passage with its text and little-endian f32 vector blob. Foreign keys tie
//! each record to its collection, so they are enabled on every connection.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use recall_core::error::RecallError;

use crate::migrations;

const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
                            PRAGMA synchronous = NORMAL;
                            PRAGMA foreign_keys = ON;";

/// SQLite connection shared by every repository opened on the same file.
///
/// rusqlite's `Connection` is not `Sync`, hence the mutex.
pub struct Database {
    conn: Mutex<Connection>,
    /// `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the collection database at `path`, creating parent
    /// directories and applying pending migrations.
    pub fn new(path: &Path) -> Result<Self, RecallError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| RecallError::Storage(format!("Failed to open database: {}", e)))?;
        let db = Self::init(conn, FILE_PRAGMAS, Some(path.to_path_buf()))?;

        info!(path = %path.display(), "Collection database opened");
        Ok(db)
    }

    /// Open a throwaway in-memory database.
    pub fn in_memory() -> Result<Self, RecallError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RecallError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::init(conn, "PRAGMA foreign_keys = ON;", None)
    }

    fn init(conn: Connection, pragmas: &str, path: Option<PathBuf>) -> Result<Self, RecallError> {
        conn.execute_batch(pragmas)
            .map_err(|e| RecallError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
            path,
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// File backing this database, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with the connection locked for its whole duration.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, RecallError>
    where
        F: FnOnce(&Connection) -> Result<T, RecallError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RecallError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}
