//! Server configuration from environment variables.
//!
//! HOST, PORT, DATA_DIR, RECORDS_FILE, STATS_FILE, BASELINE_FILE, STATIC_DIR.
//! Missing or unparseable values fall back to the defaults below.

use crate::storage::CsvStore;
use std::path::PathBuf;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_records_file() -> String {
    "team_building_record.csv".to_string()
}

fn default_stats_file() -> String {
    "player_statistics.csv".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the CSV tables.
    pub data_dir: PathBuf,
    pub records_file: String,
    pub stats_file: String,
    /// Baseline statistics table, relative to `data_dir`.
    pub baseline_file: Option<String>,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            records_file: default_records_file(),
            stats_file: default_stats_file(),
            baseline_file: None,
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            host: var("HOST").unwrap_or_else(default_host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or_else(default_data_dir),
            records_file: var("RECORDS_FILE").unwrap_or_else(default_records_file),
            stats_file: var("STATS_FILE").unwrap_or_else(default_stats_file),
            baseline_file: var("BASELINE_FILE"),
            static_dir: var("STATIC_DIR").map(PathBuf::from).unwrap_or_else(default_static_dir),
        }
    }

    /// Store over the configured tables.
    pub fn store(&self) -> CsvStore {
        let store = CsvStore::new(
            self.data_dir.join(&self.records_file),
            self.data_dir.join(&self.stats_file),
        );
        match &self.baseline_file {
            Some(file) => store.with_baseline(self.data_dir.join(file)),
            None => store,
        }
    }
}
