use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::path::Path;

use crate::app_config::{Config, ViewStyle};
use crate::database::{BatchId, Database, DatabaseStats, ImportRecord, RankingEntry, RankingRepository};
use crate::errors::ImportError;
use crate::importer::{BatchClock, ImportSummary, Importer, SystemClock};
use crate::view;

// @module: Application controller wiring configuration, importer and store

/// Entry point shared by every front-end.
///
/// Holds no selection state: the caller passes the batch it wants into
/// each operation.
pub struct Controller<C: BatchClock = SystemClock> {
    // @field: App configuration
    config: Config,
    // @field: CSV importer bound to the configured store
    importer: Importer<C>,
}

impl Controller<SystemClock> {
    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: BatchClock> Controller<C> {
    /// Create a controller whose imports take their batch id from `clock`
    pub fn with_clock(config: Config, clock: C) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let repo = RankingRepository::new(Database::new(&config.database_path));
        let importer = Importer::with_clock(repo, clock).with_log_mode(config.error_log_mode);

        debug!("Controller ready with store {:?}", config.database_path);
        Ok(Self { config, importer })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn repo(&self) -> &RankingRepository {
        self.importer.repository()
    }

    /// Import a CSV file. Rejected rows go to `error_log`, or to the
    /// configured error log when none is given.
    pub fn import_file(&self, source: &Path, error_log: Option<&Path>) -> Result<ImportSummary, ImportError> {
        let error_log = error_log.unwrap_or(self.config.error_log_path.as_path());
        self.importer.import(source, error_log)
    }

    /// Batch ids, most recent first
    pub fn batches(&self) -> Result<Vec<BatchId>> {
        self.repo().list_batches()
    }

    /// Import metadata per batch, most recent first
    pub fn batch_details(&self) -> Result<Vec<ImportRecord>> {
        self.repo().batch_details()
    }

    /// The batch to show: the one selected by the caller, or the most
    /// recent one when nothing is selected
    pub fn resolve_batch(&self, selected: Option<&str>) -> Result<Option<String>> {
        match selected.map(str::trim).filter(|s| !s.is_empty()) {
            Some(batch) => Ok(Some(batch.to_string())),
            None => Ok(self.repo().latest_batch()?.map(|b| b.to_string())),
        }
    }

    /// Ranking of one batch
    pub fn ranking(&self, batch_id: &str) -> Result<Vec<RankingEntry>> {
        self.repo().fetch_batch(batch_id)
    }

    /// Render a batch with the given view style, falling back to the
    /// configured one. Returns false when there is no batch to show.
    pub fn show(&self, selected: Option<&str>, style: Option<ViewStyle>, out: &mut dyn Write) -> Result<bool> {
        let Some(batch_id) = self.resolve_batch(selected)? else {
            warn!("No import history available");
            return Ok(false);
        };

        let entries = self.ranking(&batch_id)?;
        let style = style.unwrap_or(self.config.view);
        view::view_for(style)
            .render(&batch_id, &entries, out)
            .context("Failed to render ranking")?;
        Ok(true)
    }

    /// Delete a batch. Confirmation is the caller's job.
    pub fn delete(&self, batch_id: &str) -> Result<usize> {
        let deleted = self.repo().delete_batch(batch_id)?;
        if deleted == 0 {
            warn!("No records found for batch '{}'", batch_id);
        } else {
            info!("Batch {} removed ({} records)", batch_id, deleted);
        }
        Ok(deleted)
    }

    /// Store statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.repo().stats()
    }
}
