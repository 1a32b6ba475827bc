/*!
 * Database connection management.
 *
 * The store is a single SQLite file. A connection is opened for each
 * operation and closed when the operation returns, so no handle outlives
 * a request. The schema is ensured every time a connection is opened.
 */

use anyhow::{Context, Result};
use log::debug;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use super::schema;

/// Default database filename
pub const DEFAULT_DB_FILENAME: &str = "ranking.db";

/// Handle on the store file
#[derive(Debug, Clone)]
pub struct Database {
    /// Path to the database file
    db_path: PathBuf,
}

impl Database {
    /// Store in `ranking.db` under the current directory
    pub fn new_default() -> Self {
        Self::new(DEFAULT_DB_FILENAME)
    }

    /// Store at the specified path. Nothing is touched on disk until the
    /// first operation.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a fresh connection with the schema in place
    pub fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }

        debug!("Opening database at: {:?}", self.db_path);

        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open database: {:?}", self.db_path))?;

        schema::initialize_schema(&conn)?;

        Ok(conn)
    }

    /// Execute a database operation on a connection opened for this call only
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.open()?;
        f(&conn)
    }

    /// Run operations inside one transaction, committed only if `f` succeeds
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T>,
    {
        let mut conn = self.open()?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        let (batch_count, record_count) = self.execute(|conn| {
            let batch_count: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT batch_id) FROM ranking",
                [],
                |row| row.get(0),
            )?;
            let record_count: i64 =
                conn.query_row("SELECT COUNT(*) FROM ranking", [], |row| row.get(0))?;
            Ok((batch_count, record_count))
        })?;

        let file_size_bytes = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(DatabaseStats {
            batch_count,
            record_count,
            file_size_bytes,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Number of distinct import batches
    pub batch_count: i64,
    /// Number of player records across all batches
    pub record_count: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Batches: {}, Records: {}, Size: {} KB",
            self.batch_count,
            self.record_count,
            self.file_size_bytes / 1024
        )
    }
}
