//! Data structures for the poker night ledger: players, sessions, history records.

mod columns;
mod ledger;
mod player;
mod record;
mod session;

pub use columns::round_cents;
pub use ledger::{CommitRequest, CommitResponse, Ledger, LedgerError};
pub use player::{winning_rate_label, PlayerStat};
pub use record::{
    format_canonical_date, parse_canonical_date, HistoryRecord, CANONICAL_DATE_FORMAT,
};
pub use session::{
    DuplicateDecision, DuplicateReport, Outcome, Session, SessionBuilder, SessionDraft,
    SessionEntry, SessionId, SessionStage, ValidatedEntry, ValidationError,
};
