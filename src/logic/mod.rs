//! Settlement logic: validation, fee allocation, duplicate gate, leaderboard, history queries.

mod aggregate;
mod commit;
mod duplicates;
mod fees;
mod history;
mod validate;

pub use aggregate::{recompute, recompute_with_baseline};
pub use commit::{
    check_session, commit_offline, commit_session, finish_commit, prepare_commit, settle,
    CommitSink, OfflineSink,
};
pub use duplicates::{check_duplicates, find_exact_duplicate};
pub use fees::{allocate_fees, allocate_session_fees};
pub use history::{find_by_date, latest_date, records_on};
pub use validate::validate_session;
