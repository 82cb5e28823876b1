//! CSV-backed persistence for the records and statistics tables.

mod csv_store;

pub use csv_store::CsvStore;

use std::path::PathBuf;

/// Errors that can occur while reading or writing the tables.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// A new record repeats (date, player, chips) of a persisted one.
    DuplicateRecord { player: String, date: String },
    /// Nothing to commit.
    EmptyCommit,
    /// Table path has no file name to derive temp/backup names from.
    InvalidPath(PathBuf),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Csv(e) => write!(f, "CSV error: {}", e),
            StorageError::DuplicateRecord { player, date } => write!(
                f,
                "Record for {} on {} with the same chips already exists",
                player, date
            ),
            StorageError::EmptyCommit => write!(f, "No records to commit"),
            StorageError::InvalidPath(p) => write!(f, "Invalid table path: {}", p.display()),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<csv::Error> for StorageError {
    fn from(e: csv::Error) -> Self {
        StorageError::Csv(e)
    }
}
