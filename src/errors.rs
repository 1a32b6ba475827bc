/*!
 * Error types for the player ranking application.
 *
 * This module contains custom error types for the importer and the
 * per-row validation, using the thiserror crate for ergonomic error definitions.
 */

use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single CSV data row is rejected.
///
/// The `Display` output is the reason written to the error log, so the
/// messages are kept in the language of the log format.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// Row does not have exactly name, level and score
    #[error("Número de colunas inválido.")]
    WrongColumnCount {
        /// Number of fields actually found
        found: usize,
    },

    /// Level is not an integer
    #[error("Nível inválido '{value}': {source}")]
    InvalidLevel {
        /// Trimmed raw value
        value: String,
        /// Underlying parse failure
        source: ParseIntError,
    },

    /// Score is not a real number
    #[error("Pontuação inválida '{value}': {source}")]
    InvalidScore {
        /// Trimmed raw value
        value: String,
        /// Underlying parse failure
        source: ParseFloatError,
    },

    /// Score parsed as NaN
    #[error("Pontuação inválida '{value}': não é um número.")]
    NanScore {
        /// Trimmed raw value
        value: String,
    },

    /// Name is empty after trimming
    #[error("Nome do jogador não pode ser vazio.")]
    EmptyName,

    /// Row bytes are not valid UTF-8
    #[error("Codificação inválida (esperado UTF-8).")]
    InvalidEncoding,
}

/// Errors that abort an import
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source file does not exist or cannot be opened
    #[error("Source file '{}' could not be opened: {source}", .path.display())]
    SourceNotFound {
        /// Path given by the caller
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The source was opened but could not be parsed as delimited text
    #[error("Failed to read source file '{}': {source}", .path.display())]
    SourceRead {
        /// Path given by the caller
        path: PathBuf,
        /// Underlying CSV reader failure
        source: csv::Error,
    },

    /// The error log could not be created or written
    #[error("Failed to write error log '{}': {source}", .path.display())]
    ErrorLog {
        /// Error log path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// The store rejected the operation
    #[error("Store error: {0}")]
    Store(String),
}

impl ImportError {
    /// True when the import failed because the source could not be opened
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }
}

impl From<anyhow::Error> for ImportError {
    fn from(error: anyhow::Error) -> Self {
        Self::Store(format!("{:#}", error))
    }
}
