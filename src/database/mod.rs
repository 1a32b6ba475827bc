/*!
 * Database module for persistent storage of player rankings.
 *
 * This module provides SQLite-based persistence for:
 * - Player records grouped by import batch
 * - Import metadata (source file, hash, row counts)
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{Database, DatabaseStats};
pub use models::{BatchId, ImportRecord, PlayerRecord, RankingEntry};
pub use repository::RankingRepository;
