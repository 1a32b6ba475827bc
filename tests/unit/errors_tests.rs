/*!
 * Tests for error types and row validation reasons
 */

use std::path::PathBuf;
use player_ranking::errors::{ImportError, RowError};
use player_ranking::importer::validate_row;

/// Test the fixed reasons written to the error log
#[test]
fn test_rowError_display_shouldMatchLogReasons() {
    assert_eq!(
        RowError::WrongColumnCount { found: 2 }.to_string(),
        "Número de colunas inválido."
    );
    assert_eq!(RowError::EmptyName.to_string(), "Nome do jogador não pode ser vazio.");
    assert_eq!(
        RowError::NanScore { value: "NaN".to_string() }.to_string(),
        "Pontuação inválida 'NaN': não é um número."
    );
}

/// Test that parse failures keep the offending value in the reason
#[test]
fn test_validateRow_withBadNumbers_shouldNameTheValue() {
    let level = validate_row(&["Bob", "abc", "50.0"]).unwrap_err();
    assert!(matches!(level, RowError::InvalidLevel { ref value, .. } if value == "abc"));
    assert!(level.to_string().starts_with("Nível inválido 'abc': "));

    let score = validate_row(&["Bob", "5", "muito"]).unwrap_err();
    assert!(matches!(score, RowError::InvalidScore { ref value, .. } if value == "muito"));
    assert!(score.to_string().starts_with("Pontuação inválida 'muito': "));
}

/// Test the order in which row checks are applied
#[test]
fn test_validateRow_withSeveralProblems_shouldReportFirstCheck() {
    assert_eq!(
        validate_row(&["", "x", "y", "z"]).unwrap_err(),
        RowError::WrongColumnCount { found: 4 }
    );
    assert!(matches!(
        validate_row(&["", "x", "y"]).unwrap_err(),
        RowError::InvalidLevel { .. }
    ));
    assert!(matches!(
        validate_row(&["", "1", "y"]).unwrap_err(),
        RowError::InvalidScore { .. }
    ));
    assert_eq!(validate_row(&["  ", "1", "2"]).unwrap_err(), RowError::EmptyName);
}

/// Test that fields are trimmed before parsing
#[test]
fn test_validateRow_withPaddedFields_shouldTrim() {
    let entry = validate_row(&["  Ana ", " -3 ", " 1e3 "]).unwrap();

    assert_eq!(entry.name, "Ana");
    assert_eq!(entry.level, -3);
    assert_eq!(entry.score, 1000.0);
}

/// Test the source-not-found classification and message
#[test]
fn test_importError_sourceNotFound_shouldBeClassified() {
    let error = ImportError::SourceNotFound {
        path: PathBuf::from("faltando.csv"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    };

    assert!(error.is_source_not_found());
    assert!(error.to_string().contains("faltando.csv"));

    let store: ImportError = anyhow::anyhow!("disk full").into();
    assert!(!store.is_source_not_found());
    assert_eq!(store.to_string(), "Store error: disk full");
}
