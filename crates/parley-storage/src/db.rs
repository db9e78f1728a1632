//! SQLite connection holding the conversation log.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use parley_core::error::ParleyError;

use crate::migrations;

/// Applied to every file-backed connection.
const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
                            PRAGMA synchronous = NORMAL;";

/// A single connection behind a mutex. Every query goes through
/// [`Database::with_conn`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file, creating parent directories,
    /// and bring the schema up to date.
    pub fn new(path: &Path) -> Result<Self, ParleyError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            ParleyError::Storage(format!("Cannot open {}: {}", path.display(), e))
        })?;
        conn.execute_batch(FILE_PRAGMAS)
            .map_err(|e| ParleyError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self::migrated(conn)?;
        info!(path = %path.display(), "Conversation database ready");
        Ok(db)
    }

    /// A throwaway database for tests and offline demos.
    pub fn in_memory() -> Result<Self, ParleyError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ParleyError::Storage(format!("Cannot open in-memory db: {}", e)))?;
        Self::migrated(conn)
    }

    fn migrated(conn: Connection) -> Result<Self, ParleyError> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` while holding the connection lock.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ParleyError>
    where
        F: FnOnce(&Connection) -> Result<T, ParleyError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ParleyError::Storage("database lock poisoned".to_string()))?;
        f(&conn)
    }

    pub fn schema_version(&self) -> Result<i64, ParleyError> {
        self.with_conn(migrations::current_version)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
