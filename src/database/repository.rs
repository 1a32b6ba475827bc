/*!
 * Repository layer for database operations.
 *
 * This module provides the batch-versioned query API over the ranking
 * store: inserting an import batch, listing batches, fetching one batch's
 * ranking and deleting a batch. Every call opens its own connection.
 */

use anyhow::Result;
use log::{debug, info, warn};
use rusqlite::{params, OptionalExtension};

use super::connection::{Database, DatabaseStats};
use super::models::{BatchId, ImportRecord, PlayerRecord, RankingEntry};

/// Repository for ranking operations
#[derive(Debug, Clone)]
pub struct RankingRepository {
    /// Database handle
    db: Database,
}

impl RankingRepository {
    /// Create a new repository over the given database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a repository over `ranking.db` in the current directory
    pub fn new_default() -> Self {
        Self::new(Database::new_default())
    }

    /// Underlying database handle
    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Batch Writes
    // =========================================================================

    /// Insert every record of one import and its metadata in a single
    /// transaction. Nothing is written when `records` is empty.
    pub fn insert_batch(&self, records: &[PlayerRecord], import: &ImportRecord) -> Result<usize> {
        if records.is_empty() {
            // Still ensure the store exists so a later listing finds a schema.
            self.db.execute(|_| Ok(()))?;
            debug!("No records to insert for batch {}", import.batch_id);
            return Ok(0);
        }

        let inserted = self.db.transaction(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO ranking (name, level, score, batch_id) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.name,
                    record.level,
                    record.score,
                    record.batch_id.as_str(),
                ])?;
            }

            // Two imports started within the same second share a batch id;
            // their counts are merged and the metadata keeps the first source.
            let existing_source: Option<String> = tx
                .query_row(
                    "SELECT source_path FROM imports WHERE batch_id = ?1",
                    [import.batch_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(existing_source) = existing_source {
                warn!(
                    "Batch {} already holds an import of '{}'; merging '{}' into it",
                    import.batch_id, existing_source, import.source_path
                );
            }

            tx.execute(
                r#"
                INSERT INTO imports (batch_id, source_path, source_sha256, imported, rejected, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
                ON CONFLICT(batch_id) DO UPDATE SET
                    imported = imported + excluded.imported,
                    rejected = rejected + excluded.rejected
                "#,
                params![
                    import.batch_id.as_str(),
                    import.source_path,
                    import.source_sha256,
                    import.imported,
                    import.rejected,
                ],
            )?;

            Ok(records.len())
        })?;

        info!("Stored {} records in batch {}", inserted, import.batch_id);
        Ok(inserted)
    }

    // =========================================================================
    // Batch Queries
    // =========================================================================

    /// Distinct batch ids, most recent first
    pub fn list_batches(&self) -> Result<Vec<BatchId>> {
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT batch_id FROM ranking WHERE batch_id IS NOT NULL ORDER BY batch_id DESC",
            )?;
            let batches = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            // Ids are read back verbatim; a legacy row with an odd id must
            // still be listed so it can be fetched and deleted.
            Ok(batches.into_iter().map(BatchId::from_stored).collect())
        })
    }

    /// Most recent batch id, if any
    pub fn latest_batch(&self) -> Result<Option<BatchId>> {
        self.db.execute(|conn| {
            let latest = conn
                .query_row(
                    "SELECT MAX(batch_id) FROM ranking",
                    [],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()?
                .flatten();
            Ok(latest.map(BatchId::from_stored))
        })
    }

    /// One batch's ranking, highest score first; ties keep file order.
    /// An empty or unknown batch id yields an empty ranking.
    pub fn fetch_batch(&self, batch_id: &str) -> Result<Vec<RankingEntry>> {
        if batch_id.is_empty() {
            return Ok(Vec::new());
        }

        let batch_id = batch_id.to_string();
        self.db.execute(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT name, level, score
                FROM ranking
                WHERE batch_id = ?1
                ORDER BY score DESC, rowid ASC
                "#,
            )?;

            let entries = stmt
                .query_map([&batch_id], |row| {
                    Ok(RankingEntry {
                        name: row.get(0)?,
                        level: row.get(1)?,
                        // NaN is stored as NULL
                        score: row.get::<_, Option<f64>>(2)?.unwrap_or(f64::NAN),
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(entries)
        })
    }

    /// Remove every record of a batch together with its metadata.
    /// Returns the number of records removed; unknown ids remove nothing.
    pub fn delete_batch(&self, batch_id: &str) -> Result<usize> {
        if batch_id.is_empty() {
            return Ok(0);
        }

        let deleted = self.db.transaction(|tx| {
            let deleted = tx.execute("DELETE FROM ranking WHERE batch_id = ?1", [batch_id])?;
            tx.execute("DELETE FROM imports WHERE batch_id = ?1", [batch_id])?;
            Ok(deleted)
        })?;

        info!("Deleted {} records from batch {}", deleted, batch_id);
        Ok(deleted)
    }

    /// Import metadata for every listed batch, most recent first. Batches
    /// without a metadata row (written by older versions) get empty source
    /// fields and counts derived from the ranking table.
    pub fn batch_details(&self) -> Result<Vec<ImportRecord>> {
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT r.batch_id,
                       COALESCE(i.source_path, ''),
                       COALESCE(i.source_sha256, ''),
                       COUNT(*),
                       COALESCE(i.rejected, 0)
                FROM ranking r
                LEFT JOIN imports i ON i.batch_id = r.batch_id
                WHERE r.batch_id IS NOT NULL
                GROUP BY r.batch_id
                ORDER BY r.batch_id DESC
                "#,
            )?;

            let details = stmt
                .query_map([], |row| {
                    Ok(ImportRecord {
                        batch_id: BatchId::from_stored(row.get::<_, String>(0)?),
                        source_path: row.get(1)?,
                        source_sha256: row.get(2)?,
                        imported: row.get(3)?,
                        rejected: row.get(4)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(details)
        })
    }

    /// Store statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.db.stats()
    }
}
