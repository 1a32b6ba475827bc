/*!
 * Full app lifecycle through the controller
 */

use anyhow::Result;
use std::io::Cursor;
use std::path::Path;
use player_ranking::app_config::{Config, ViewStyle};
use player_ranking::app_controller::Controller;
use player_ranking::importer::{ErrorLogMode, FixedClock};
use player_ranking::view::confirm_deletion;
use crate::common;

fn test_config(dir: &Path) -> Config {
    Config {
        database_path: dir.join("ranking.db"),
        error_log_path: dir.join("erros.log"),
        ..Config::default()
    }
}

fn controller_at(config: Config, hour: u32) -> Result<Controller<FixedClock>> {
    Controller::with_clock(config, FixedClock(common::at(hour, 0, 0)))
}

/// Test import, show, confirm and delete from a fresh store
#[test]
fn test_controller_fullLifecycle_shouldImportShowAndDelete() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path());
    let csv = common::create_test_csv(temp_dir.path(), "players.csv", &["Alice,10,99.5", "Carol,7,100.0"])?;

    let controller = controller_at(config.clone(), 10)?;

    let mut out = Vec::new();
    assert!(!controller.show(None, None, &mut out)?);
    assert!(out.is_empty());

    let summary = controller.import_file(&csv, None)?;
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.error_log_path, config.error_log_path);

    let mut out = Vec::new();
    assert!(controller.show(None, Some(ViewStyle::Text), &mut out)?);
    let text = String::from_utf8(out)?;
    assert!(text.starts_with("Ranking de 2024-05-01 10:00:00\n"));
    assert!(text.contains("1. Carol (Nível 7) - 100.00 pontos"));

    let mut input = Cursor::new(b"s\n".to_vec());
    let mut prompt = Vec::new();
    assert!(confirm_deletion("2024-05-01 10:00:00", &mut input, &mut prompt)?);
    assert_eq!(controller.delete("2024-05-01 10:00:00")?, 2);

    assert!(controller.batches()?.is_empty());
    assert_eq!(controller.resolve_batch(None)?, None);
    Ok(())
}

/// Test that the most recent batch is shown when nothing is selected
#[test]
fn test_resolveBatch_withoutSelection_shouldPickLatest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path());
    let csv = common::create_test_csv(temp_dir.path(), "players.csv", &["Alice,10,99.5"])?;

    controller_at(config.clone(), 8)?.import_file(&csv, None)?;
    let controller = controller_at(config, 9)?;
    controller.import_file(&csv, None)?;

    assert_eq!(controller.resolve_batch(None)?.as_deref(), Some("2024-05-01 09:00:00"));
    assert_eq!(controller.resolve_batch(Some("   "))?.as_deref(), Some("2024-05-01 09:00:00"));
    assert_eq!(
        controller.resolve_batch(Some("2024-05-01 08:00:00"))?.as_deref(),
        Some("2024-05-01 08:00:00")
    );
    Ok(())
}

/// Test that an unknown selection renders an empty ranking
#[test]
fn test_show_withUnknownBatch_shouldRenderEmptyRanking() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_at(test_config(temp_dir.path()), 10)?;

    let mut out = Vec::new();
    assert!(controller.show(Some("1999-01-01 00:00:00"), None, &mut out)?);

    let rendered = String::from_utf8(out)?;
    assert!(rendered.contains("Nenhum jogador encontrado para este histórico."));
    assert_eq!(controller.delete("1999-01-01 00:00:00")?, 0);
    Ok(())
}

/// Test that an explicit error log path overrides the configured one
#[test]
fn test_importFile_withExplicitLog_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path());
    let csv = common::create_test_csv(temp_dir.path(), "players.csv", &["Bob,x,1"])?;
    let custom_log = temp_dir.path().join("custom.log");

    let controller = controller_at(config.clone(), 10)?;
    controller.import_file(&csv, Some(&custom_log))?;

    assert_eq!(common::read_log_lines(&custom_log)?.len(), 1);
    assert!(!config.error_log_path.exists());
    Ok(())
}

/// Test that the configured log mode reaches the importer
#[test]
fn test_controller_withAppendMode_shouldAppendToLog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config {
        error_log_mode: ErrorLogMode::Append,
        ..test_config(temp_dir.path())
    };
    let csv = common::create_test_csv(temp_dir.path(), "players.csv", &["Bob,x,1"])?;

    controller_at(config.clone(), 10)?.import_file(&csv, None)?;
    controller_at(config.clone(), 11)?.import_file(&csv, None)?;

    assert_eq!(common::read_log_lines(&config.error_log_path)?.len(), 4);
    Ok(())
}

/// Test that invalid configuration is refused at construction
#[test]
fn test_controller_withInvalidConfig_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = test_config(temp_dir.path());
    config.error_log_path = config.database_path.clone();

    assert!(Controller::with_config(config).is_err());
    Ok(())
}

/// Test that stats reflect imported batches
#[test]
fn test_stats_afterImports_shouldCountBatchesAndRecords() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path());
    let csv = common::create_test_csv(temp_dir.path(), "players.csv", &["Alice,10,99.5", "Bob,3,50"])?;

    controller_at(config.clone(), 8)?.import_file(&csv, None)?;
    let controller = controller_at(config, 9)?;
    controller.import_file(&csv, None)?;

    let stats = controller.stats()?;
    assert_eq!(stats.batch_count, 2);
    assert_eq!(stats.record_count, 4);
    assert_eq!(controller.batch_details()?.len(), 2);
    Ok(())
}
