/*!
 * # Player Ranking
 *
 * A Rust library for importing CSV files of player records into a
 * batch-versioned SQLite store and browsing each import's ranking.
 *
 * ## Features
 *
 * - Per-row CSV validation with an error log of rejected lines
 * - Every import tagged with its start timestamp as a batch id
 * - List, show and delete batches; rankings sorted by score
 * - Interchangeable grid, text and JSON views
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `importer`: CSV validation and batch import
 * - `database`: SQLite persistence:
 *   - `database::schema`: Table definitions and migrations
 *   - `database::connection`: Per-operation connections
 *   - `database::repository`: Batch queries
 *   - `database::models`: Records and batch ids
 * - `view`: Ranking renderers
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod importer;
pub mod view;

// Re-export main types for easier usage
pub use app_config::{Config, LogLevel, ViewStyle};
pub use app_controller::Controller;
pub use database::{BatchId, RankingEntry, RankingRepository};
pub use errors::{ImportError, RowError};
pub use importer::{ErrorLogMode, ImportSummary, Importer};
