use chrono::{Local, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::database::{BatchId, ImportRecord, PlayerRecord, RankingEntry, RankingRepository};
use crate::errors::{ImportError, RowError};

// @module: CSV import with per-row validation

/// Source of the import timestamp
pub trait BatchClock {
    /// Local wall-clock time at which an import starts
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BatchClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl BatchClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// What happens to an existing error log when an import starts
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorLogMode {
    /// Truncate the log on every import
    #[default]
    Overwrite,
    /// Keep earlier content and start each import with a header line
    Append,
}

/// A data row that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 1-based line in the source file, header included
    pub line: u64,
    /// Original field values joined by commas
    pub raw: String,
    /// Why the row was rejected
    pub error: RowError,
}

impl RejectedRow {
    /// Line written to the error log, without the trailing newline
    pub fn log_line(&self) -> String {
        format!("Linha {}: '{}' -> Erro: {}", self.line, self.raw, self.error)
    }
}

/// Outcome of one import call
#[derive(Debug, Clone)]
pub struct ImportSummary {
    /// Batch id of the imported rows, `None` when nothing was valid
    pub batch_id: Option<BatchId>,
    /// Number of rows written to the store
    pub imported: usize,
    /// Rows written to the error log, in file order
    pub rejected: Vec<RejectedRow>,
    /// Where the rejected rows were logged
    pub error_log_path: PathBuf,
    /// SHA256 of the source file
    pub source_sha256: String,
}

/// Validate the fields of one data row.
///
/// Checks run in a fixed order: field count, level, score, then name, so a
/// row with several problems reports the first one.
pub fn validate_row(fields: &[&str]) -> Result<RankingEntry, RowError> {
    let [name, level, score] = fields else {
        return Err(RowError::WrongColumnCount { found: fields.len() });
    };

    let level_raw = level.trim();
    let level = level_raw
        .parse::<i64>()
        .map_err(|source| RowError::InvalidLevel {
            value: level_raw.to_string(),
            source,
        })?;

    let score_raw = score.trim();
    let score = score_raw
        .parse::<f64>()
        .map_err(|source| RowError::InvalidScore {
            value: score_raw.to_string(),
            source,
        })?;
    // SQLite stores NaN as NULL, which would break the ranking order
    if score.is_nan() {
        return Err(RowError::NanScore {
            value: score_raw.to_string(),
        });
    }

    let name = name.trim();
    if name.is_empty() {
        return Err(RowError::EmptyName);
    }

    Ok(RankingEntry::new(name, level, score))
}

/// Imports CSV files of players into the ranking store
pub struct Importer<C: BatchClock = SystemClock> {
    repo: RankingRepository,
    clock: C,
    log_mode: ErrorLogMode,
}

impl Importer<SystemClock> {
    /// Importer stamping batches with the local system time
    pub fn new(repo: RankingRepository) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<C: BatchClock> Importer<C> {
    /// Importer using a custom clock for batch ids
    pub fn with_clock(repo: RankingRepository, clock: C) -> Self {
        Self {
            repo,
            clock,
            log_mode: ErrorLogMode::default(),
        }
    }

    /// Set how the error log is opened
    pub fn with_log_mode(mut self, log_mode: ErrorLogMode) -> Self {
        self.log_mode = log_mode;
        self
    }

    /// Repository the importer writes to
    pub fn repository(&self) -> &RankingRepository {
        &self.repo
    }

    /// Import `source_path`, logging invalid rows to `error_log_path`.
    ///
    /// The header line is skipped. Valid rows are inserted in one
    /// transaction after the whole file has been scanned, all under the
    /// batch id taken from the clock when the call starts. If the source
    /// cannot be opened nothing is written anywhere.
    pub fn import(&self, source_path: &Path, error_log_path: &Path) -> Result<ImportSummary, ImportError> {
        let batch_id = BatchId::from_timestamp(self.clock.now());
        info!("Importing {:?} as batch {}", source_path, batch_id);

        let contents = std::fs::read(source_path).map_err(|source| ImportError::SourceNotFound {
            path: source_path.to_path_buf(),
            source,
        })?;
        let source_sha256 = format!("{:x}", Sha256::digest(&contents));

        let (valid, rejected) = scan_rows(&contents).map_err(|source| ImportError::SourceRead {
            path: source_path.to_path_buf(),
            source,
        })?;

        self.write_error_log(error_log_path, &batch_id, source_path, &rejected)
            .map_err(|source| ImportError::ErrorLog {
                path: error_log_path.to_path_buf(),
                source,
            })?;

        let records: Vec<PlayerRecord> = valid
            .into_iter()
            .map(|entry| PlayerRecord::new(entry.name, entry.level, entry.score, batch_id.clone()))
            .collect();

        let import = ImportRecord {
            batch_id: batch_id.clone(),
            source_path: source_path.to_string_lossy().into_owned(),
            source_sha256: source_sha256.clone(),
            imported: records.len() as i64,
            rejected: rejected.len() as i64,
        };
        let imported = self.repo.insert_batch(&records, &import)?;

        if !rejected.is_empty() {
            warn!(
                "{} invalid rows written to {:?}",
                rejected.len(),
                error_log_path
            );
        }
        info!("Imported {} players into batch {}", imported, batch_id);

        Ok(ImportSummary {
            batch_id: (imported > 0).then_some(batch_id),
            imported,
            rejected,
            error_log_path: error_log_path.to_path_buf(),
            source_sha256,
        })
    }

    fn write_error_log(
        &self,
        path: &Path,
        batch_id: &BatchId,
        source_path: &Path,
        rejected: &[RejectedRow],
    ) -> std::io::Result<()> {
        let file = match self.log_mode {
            ErrorLogMode::Overwrite => File::create(path)?,
            ErrorLogMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
        };
        let mut writer = BufWriter::new(file);

        if self.log_mode == ErrorLogMode::Append {
            writeln!(writer, "=== Importação {}: {} ===", batch_id, source_path.display())?;
        }
        for row in rejected {
            writeln!(writer, "{}", row.log_line())?;
        }

        writer.flush()
    }
}

/// Split the file into valid entries and rejected rows, skipping the header.
///
/// The reader drops empty lines on its own, so line numbers are taken from
/// record byte offsets and the lines between two records are checked for
/// blank data rows.
fn scan_rows(contents: &[u8]) -> Result<(Vec<RankingEntry>, Vec<RejectedRow>), csv::Error> {
    let line_starts = line_starts(contents);
    let line_of = |offset: usize| line_starts.partition_point(|&start| start <= offset) as u64;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents);

    let mut valid = Vec::new();
    let mut rejected = Vec::new();
    let mut record = ByteRecord::new();
    // End of the last record read; anything between it and the next record
    // holds only line terminators.
    let mut cursor = 0usize;
    let mut header_pending = true;

    while reader.read_byte_record(&mut record)? {
        let start = record
            .position()
            .map(|p| p.byte() as usize)
            .unwrap_or(cursor);
        reject_blank_lines(contents, &line_starts, cursor..start, &mut rejected);
        cursor = reader.position().byte() as usize;

        // Physical line 1 is the header, whatever it holds
        let line = line_of(start);
        if header_pending {
            header_pending = false;
            if line <= 1 {
                continue;
            }
        }

        match check_record(record.clone()) {
            Ok(entry) => valid.push(entry),
            Err((raw, error)) => {
                debug!("Rejected line {}: {}", line, error);
                rejected.push(RejectedRow { line, raw, error });
            }
        }
    }
    reject_blank_lines(contents, &line_starts, cursor..contents.len(), &mut rejected);

    Ok((valid, rejected))
}

/// Byte offset at which each physical line starts
fn line_starts(contents: &[u8]) -> Vec<usize> {
    std::iter::once(0)
        .chain(
            contents
                .iter()
                .enumerate()
                .filter(|(_, byte)| **byte == b'\n')
                .map(|(i, _)| i + 1),
        )
        .filter(|&start| start < contents.len())
        .collect()
}

/// Log every empty line starting inside `gap` as a row with no fields
fn reject_blank_lines(
    contents: &[u8],
    line_starts: &[usize],
    gap: Range<usize>,
    rejected: &mut Vec<RejectedRow>,
) {
    let first = line_starts.partition_point(|&start| start < gap.start);

    for (index, &start) in line_starts.iter().enumerate().skip(first) {
        if start >= gap.end {
            break;
        }
        let line = index as u64 + 1;
        if line == 1 || !is_blank_line(&contents[start..]) {
            continue;
        }

        debug!("Rejected blank line {}", line);
        rejected.push(RejectedRow {
            line,
            raw: String::new(),
            error: RowError::WrongColumnCount { found: 0 },
        });
    }
}

fn is_blank_line(rest: &[u8]) -> bool {
    let end = rest.iter().position(|&byte| byte == b'\n').unwrap_or(rest.len());
    rest[..end].iter().all(|&byte| byte == b'\r')
}

fn check_record(record: ByteRecord) -> Result<RankingEntry, (String, RowError)> {
    match StringRecord::from_byte_record(record) {
        Ok(record) => {
            let fields: Vec<&str> = record.iter().collect();
            validate_row(&fields).map_err(|error| (fields.join(","), error))
        }
        Err(err) => {
            let raw = err
                .into_byte_record()
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            Err((raw, RowError::InvalidEncoding))
        }
    }
}
