//! CsvStore: records + statistics tables on disk, and the file-backed commit sink.

use crate::logic::{find_exact_duplicate, recompute_with_baseline, CommitSink};
use crate::models::{CommitRequest, CommitResponse, HistoryRecord, Ledger, PlayerStat};
use crate::storage::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of the persisted tables.
#[derive(Clone, Debug)]
pub struct CsvStore {
    records_path: PathBuf,
    stats_path: PathBuf,
    /// Optional statistics carried from before the records table began.
    baseline_path: Option<PathBuf>,
}

impl CsvStore {
    pub fn new(records_path: impl Into<PathBuf>, stats_path: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            stats_path: stats_path.into(),
            baseline_path: None,
        }
    }

    pub fn with_baseline(mut self, baseline_path: impl Into<PathBuf>) -> Self {
        self.baseline_path = Some(baseline_path.into());
        self
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    /// History rows. Rows without a Time or Player are dropped.
    pub fn read_records(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        let mut records: Vec<HistoryRecord> = read_table(&self.records_path)?;
        records.retain(|r| !r.time.trim().is_empty() && !r.player.trim().is_empty());
        Ok(records)
    }

    /// Leaderboard rows, in file order.
    pub fn read_stats(&self) -> Result<Vec<PlayerStat>, StorageError> {
        let mut stats: Vec<PlayerStat> = read_table(&self.stats_path)?;
        stats.retain(|p| !p.name.trim().is_empty());
        Ok(stats)
    }

    /// Baseline rows, or none if no baseline table is configured.
    pub fn read_baseline(&self) -> Result<Vec<PlayerStat>, StorageError> {
        match &self.baseline_path {
            Some(path) => {
                let mut rows: Vec<PlayerStat> = read_table(path)?;
                rows.retain(|p| !p.name.trim().is_empty());
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Load all three tables into a ledger, leaderboard sorted by rank.
    pub fn load_ledger(&self) -> Result<Ledger, StorageError> {
        let history = self.read_records()?;
        let mut stats = self.read_stats()?;
        stats.sort_by_key(|p| p.rank);
        let baseline = self.read_baseline()?;
        log::info!(
            "Loaded {} records and {} player statistics",
            history.len(),
            stats.len()
        );
        Ok(Ledger::with_tables(history, stats, baseline))
    }

    /// Persist the leaderboard alone (e.g. after adding a player).
    pub fn write_stats(&self, stats: &[PlayerStat]) -> Result<(), StorageError> {
        let staged = stage_table(&self.stats_path, stats)?;
        if let Err(e) = replace_table(&self.stats_path, &staged) {
            let _ = fs::remove_file(&staged);
            return Err(e);
        }
        Ok(())
    }

    /// Append `new_records` to the persisted history and recompute the leaderboard.
    ///
    /// Refuses the whole batch if any record repeats (date, player, chips) of a
    /// persisted one. Both tables are staged to temp files before either is
    /// swapped in; if the leaderboard cannot be swapped in, the records table
    /// is rolled back from its backup. Returns the new history and leaderboard.
    pub fn append_records(
        &self,
        new_records: &[HistoryRecord],
    ) -> Result<(Vec<HistoryRecord>, Vec<PlayerStat>), StorageError> {
        if new_records.is_empty() {
            return Err(StorageError::EmptyCommit);
        }
        let mut history = self.read_records()?;
        if let Some(dup) = find_exact_duplicate(new_records, &history) {
            log::warn!(
                "Rejected commit: {} on {} already recorded with {} chips",
                dup.player,
                dup.time,
                dup.chips
            );
            return Err(StorageError::DuplicateRecord {
                player: dup.player.clone(),
                date: dup.time.clone(),
            });
        }

        let mut known = self.read_stats()?;
        known.sort_by_key(|p| p.rank);
        let known: Vec<String> = known.into_iter().map(|p| p.name).collect();
        let baseline = self.read_baseline()?;

        let before = history.len();
        history.extend_from_slice(new_records);
        let stats = recompute_with_baseline(&baseline, &history, &known);

        let staged_records = stage_table(&self.records_path, &history)?;
        let staged_stats = match stage_table(&self.stats_path, &stats) {
            Ok(path) => path,
            Err(e) => {
                let _ = fs::remove_file(&staged_records);
                return Err(e);
            }
        };
        let records_backup = match replace_table(&self.records_path, &staged_records) {
            Ok(backup) => backup,
            Err(e) => {
                let _ = fs::remove_file(&staged_records);
                let _ = fs::remove_file(&staged_stats);
                return Err(e);
            }
        };
        if let Err(e) = replace_table(&self.stats_path, &staged_stats) {
            let _ = fs::remove_file(&staged_stats);
            restore_table(&self.records_path, records_backup.as_deref());
            return Err(e);
        }

        log::info!(
            "Merged records: {} + {} = {}; {} player statistics",
            before,
            new_records.len(),
            history.len(),
            stats.len()
        );
        Ok((history, stats))
    }
}

impl CommitSink for CsvStore {
    fn commit(&mut self, request: &CommitRequest) -> CommitResponse {
        match self.append_records(&request.new_records) {
            Ok((history, stats)) => CommitResponse::accepted(history, stats),
            Err(e) => {
                log::error!("Commit to {} failed: {}", self.records_path.display(), e);
                CommitResponse::rejected(e.to_string())
            }
        }
    }
}

/// `path` with `suffix` appended to its file name ("a.csv" -> "a.csv.tmp").
fn sibling(path: &Path, suffix: &str) -> Result<PathBuf, StorageError> {
    let name = path
        .file_name()
        .ok_or_else(|| StorageError::InvalidPath(path.to_path_buf()))?;
    let mut name = OsString::from(name);
    name.push(suffix);
    Ok(path.with_file_name(name))
}

/// Read every row of a table. A missing file is an empty table; rows that do
/// not deserialize are skipped with a warning. I/O failures abort the read.
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        log::warn!("CSV file not found: {}", path.display());
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for (line, row) in reader.deserialize::<T>().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => log::warn!("Skipping row {} of {}: {}", line + 2, path.display(), e),
        }
    }
    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Write `rows` to a temp file next to `path` and return the temp path.
fn stage_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<PathBuf, StorageError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let temp = sibling(path, ".tmp")?;
    let result = (|| -> Result<(), StorageError> {
        let mut writer = csv::Writer::from_path(&temp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(temp)
}

/// Keep a `.bak` copy of the current table, then move the staged file over it.
/// Returns the backup path, or None if there was no table to back up.
fn replace_table(path: &Path, staged: &Path) -> Result<Option<PathBuf>, StorageError> {
    let backup = if path.exists() {
        let backup = sibling(path, ".bak")?;
        fs::copy(path, &backup)?;
        Some(backup)
    } else {
        None
    };
    fs::rename(staged, path)?;
    log::info!("Wrote {}", path.display());
    Ok(backup)
}

/// Put a replaced table back the way it was before [`replace_table`].
fn restore_table(path: &Path, backup: Option<&Path>) {
    let restored = match backup {
        Some(backup) => fs::copy(backup, path).map(|_| ()),
        None => fs::remove_file(path),
    };
    match restored {
        Ok(()) => log::warn!("Rolled back {}", path.display()),
        Err(e) => log::error!("Failed to roll back {}: {}", path.display(), e),
    }
}
