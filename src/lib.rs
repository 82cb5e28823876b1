//! Poker night ledger: library with models, settlement logic and CSV storage.

pub mod config;
pub mod logic;
pub mod models;
pub mod storage;

pub use config::ServerConfig;
pub use logic::{
    allocate_fees, allocate_session_fees, check_duplicates, check_session, commit_offline,
    commit_session, find_by_date, find_exact_duplicate, finish_commit, latest_date,
    prepare_commit, recompute, recompute_with_baseline, records_on, settle, validate_session,
    CommitSink, OfflineSink,
};
pub use models::{
    format_canonical_date, parse_canonical_date, round_cents, winning_rate_label, CommitRequest,
    CommitResponse, DuplicateDecision, DuplicateReport, HistoryRecord, Ledger, LedgerError,
    Outcome, PlayerStat, Session, SessionBuilder, SessionDraft, SessionEntry, SessionId,
    SessionStage, ValidatedEntry, ValidationError, CANONICAL_DATE_FORMAT,
};
pub use storage::{CsvStore, StorageError};
