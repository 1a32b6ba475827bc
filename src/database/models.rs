/*!
 * Database entity models.
 *
 * These structures map directly to the `ranking` and `imports` tables and
 * provide type-safe access to persisted data.
 */

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp format of a batch id. Fixed width and zero padded so that
/// lexicographic order equals chronological order.
pub const BATCH_ID_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identifier shared by every record of one import
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Build the batch id for an import that started at `timestamp`
    pub fn from_timestamp(timestamp: NaiveDateTime) -> Self {
        Self(timestamp.format(BATCH_ID_FORMAT).to_string())
    }

    /// Wrap an id read back from the store without validating its format
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// The raw id as stored in the database
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for BatchId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDateTime::parse_from_str(trimmed, BATCH_ID_FORMAT)
            .map_err(|e| anyhow::anyhow!("Invalid batch id '{}': {}", s, e))?;
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for BatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated player row ready to be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player name, trimmed and non-empty
    pub name: String,
    /// Player level
    pub level: i64,
    /// Player score
    pub score: f64,
    /// Batch the record belongs to
    pub batch_id: BatchId,
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>, level: i64, score: f64, batch_id: BatchId) -> Self {
        Self {
            name: name.into(),
            level,
            score,
            batch_id,
        }
    }
}

/// One line of a batch ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub level: i64,
    pub score: f64,
}

impl RankingEntry {
    pub fn new(name: impl Into<String>, level: i64, score: f64) -> Self {
        Self {
            name: name.into(),
            level,
            score,
        }
    }
}

impl From<PlayerRecord> for RankingEntry {
    fn from(record: PlayerRecord) -> Self {
        Self {
            name: record.name,
            level: record.level,
            score: record.score,
        }
    }
}

/// Metadata about one import batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Batch id
    pub batch_id: BatchId,
    /// Path of the imported file as given by the caller
    pub source_path: String,
    /// SHA256 of the source file contents
    pub source_sha256: String,
    /// Rows written to the ranking table
    pub imported: i64,
    /// Rows written to the error log
    pub rejected: i64,
}
