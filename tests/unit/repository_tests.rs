/*!
 * Tests for the batch query layer
 */

use anyhow::Result;
use player_ranking::database::{BatchId, Database, PlayerRecord, RankingRepository};
use player_ranking::database::models::ImportRecord;
use crate::common;

fn store(repo: &RankingRepository, batch: &str, players: &[(&str, i64, f64)]) -> Result<BatchId> {
    let batch_id: BatchId = batch.parse()?;
    let records: Vec<PlayerRecord> = players
        .iter()
        .map(|(name, level, score)| PlayerRecord::new(*name, *level, *score, batch_id.clone()))
        .collect();
    let import = ImportRecord {
        batch_id: batch_id.clone(),
        source_path: "test.csv".to_string(),
        source_sha256: String::new(),
        imported: records.len() as i64,
        rejected: 0,
    };
    repo.insert_batch(&records, &import)?;
    Ok(batch_id)
}

/// Test that listing on a store file that does not exist yet creates the schema
#[test]
fn test_listBatches_withMissingStoreFile_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db_path = temp_dir.path().join("novo").join("ranking.db");
    let repo = RankingRepository::new(Database::new(&db_path));

    assert!(repo.list_batches()?.is_empty());
    assert!(db_path.exists());
    Ok(())
}

/// Test that a batch fetch returns scores in descending order
#[test]
fn test_fetchBatch_withDifferentScores_shouldBeSortedDescending() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let repo = common::create_test_repo(temp_dir.path());
    let batch = store(
        &repo,
        "2024-05-01 10:00:00",
        &[("A", 1, 3.25), ("B", 1, -4.0), ("C", 1, 1000.0), ("D", 1, 3.5), ("E", 1, 0.0)],
    )?;

    let scores: Vec<f64> = repo.fetch_batch(batch.as_str())?.iter().map(|e| e.score).collect();

    assert_eq!(scores, vec![1000.0, 3.5, 3.25, 0.0, -4.0]);
    Ok(())
}

/// Test that duplicated rows are kept as separate records
#[test]
fn test_fetchBatch_withDuplicateRows_shouldKeepBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let repo = common::create_test_repo(temp_dir.path());
    let batch = store(&repo, "2024-05-01 10:00:00", &[("Ana", 2, 8.0), ("Ana", 2, 8.0)])?;

    assert_eq!(repo.fetch_batch(batch.as_str())?.len(), 2);
    Ok(())
}

/// Test that the store persists across repository instances
#[test]
fn test_store_shouldPersistAcrossRepositories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let batch = store(&common::create_test_repo(temp_dir.path()), "2024-05-01 10:00:00", &[("Ana", 2, 8.0)])?;

    let reopened = common::create_test_repo(temp_dir.path());

    assert_eq!(reopened.list_batches()?, vec![batch.clone()]);
    assert_eq!(reopened.fetch_batch(batch.as_str())?.len(), 1);
    Ok(())
}

/// Test that delete followed by list no longer shows the batch
#[test]
fn test_deleteBatch_thenListBatches_shouldOmitDeletedBatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let repo = common::create_test_repo(temp_dir.path());
    let old = store(&repo, "2024-05-01 09:00:00", &[("Ana", 2, 8.0)])?;
    let new = store(&repo, "2024-05-01 10:00:00", &[("Bia", 3, 9.0)])?;

    repo.delete_batch(new.as_str())?;

    assert_eq!(repo.list_batches()?, vec![old.clone()]);
    assert!(repo.fetch_batch(new.as_str())?.is_empty());
    assert_eq!(repo.latest_batch()?, Some(old));
    Ok(())
}

/// Test that deleting the same batch twice is harmless
#[test]
fn test_deleteBatch_calledTwice_shouldBeNoOpSecondTime() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let repo = common::create_test_repo(temp_dir.path());
    let batch = store(&repo, "2024-05-01 09:00:00", &[("Ana", 2, 8.0)])?;

    assert_eq!(repo.delete_batch(batch.as_str())?, 1);
    assert_eq!(repo.delete_batch(batch.as_str())?, 0);
    Ok(())
}
