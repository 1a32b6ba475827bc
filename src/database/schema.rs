/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL schema for the ranking store
 * and upgrades stores written before the schema was versioned.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        if has_legacy_ranking_table(conn)? {
            info!("Found unversioned ranking table, upgrading column names");
            migrate_legacy_ranking(conn)?;
        } else {
            info!("Initializing database schema v{}", SCHEMA_VERSION);
        }
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(anyhow::anyhow!(
            "Database schema v{} is newer than the supported v{}",
            current_version,
            SCHEMA_VERSION
        ));
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    // Records carry no identity beyond their values; rowid gives insertion order.
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS ranking (
            name TEXT,
            level INTEGER,
            score REAL,
            batch_id TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_ranking_batch ON ranking(batch_id);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS imports (
            batch_id TEXT PRIMARY KEY,
            source_path TEXT NOT NULL,
            source_sha256 TEXT NOT NULL,
            imported INTEGER NOT NULL DEFAULT 0,
            rejected INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    debug!("All tables created successfully");
    Ok(())
}

/// Check for a `ranking` table written before the schema was versioned
fn has_legacy_ranking_table(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('ranking') WHERE name = 'data_importacao'",
            [],
            |row| row.get(0),
        )
        .context("Failed to inspect ranking table")?;
    Ok(count > 0)
}

/// Rename the columns of an unversioned ranking table in place
fn migrate_legacy_ranking(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        ALTER TABLE ranking RENAME COLUMN nome TO name;
        ALTER TABLE ranking RENAME COLUMN nivel TO level;
        ALTER TABLE ranking RENAME COLUMN pontuacao TO score;
        ALTER TABLE ranking RENAME COLUMN data_importacao TO batch_id;
        "#,
    )
    .context("Failed to rename legacy ranking columns")?;
    Ok(())
}
