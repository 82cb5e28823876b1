//! Session lifecycle after validation: duplicate gate, commit sink, adopting the result.
//!
//! Validated -> FeeAllocated -> DuplicateChecked -> Committed. Nothing before
//! Committed touches the ledger, so a session can be dropped at any point.

use crate::logic::duplicates::check_duplicates;
use crate::logic::fees::allocate_session_fees;
use crate::models::{
    CommitRequest, CommitResponse, DuplicateDecision, DuplicateReport, HistoryRecord, Ledger,
    LedgerError, Session, SessionDraft, SessionStage,
};

/// Where committed records go. Returns the authoritative history and
/// leaderboard after the commit, or `success: false` with a message.
pub trait CommitSink {
    fn commit(&mut self, request: &CommitRequest) -> CommitResponse;
}

/// Local fallback sink: appends to a copy of a ledger's history and recomputes.
#[derive(Clone, Debug)]
pub struct OfflineSink {
    ledger: Ledger,
}

impl OfflineSink {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            ledger: ledger.clone(),
        }
    }
}

impl CommitSink for OfflineSink {
    fn commit(&mut self, request: &CommitRequest) -> CommitResponse {
        let (history, stats) = self.ledger.apply_commit(&request.new_records);
        self.ledger.replace(history.clone(), stats.clone());
        CommitResponse::accepted(history, stats)
    }
}

fn require_stage(session: &Session, expected: SessionStage) -> Result<(), LedgerError> {
    if session.stage != expected {
        return Err(LedgerError::InvalidStage {
            expected,
            actual: session.stage,
        });
    }
    Ok(())
}

/// Validate a draft and allocate its fee pool.
pub fn settle(draft: &SessionDraft) -> Result<Session, LedgerError> {
    let mut session = draft.validate()?;
    allocate_session_fees(&mut session)?;
    Ok(session)
}

/// Check a settled session against the ledger's history (FeeAllocated -> DuplicateChecked).
pub fn check_session(
    ledger: &Ledger,
    session: &mut Session,
) -> Result<DuplicateReport, LedgerError> {
    require_stage(session, SessionStage::FeeAllocated)?;
    let report = check_duplicates(session, ledger.history());
    session.duplicate_report = Some(report.clone());
    session.stage = SessionStage::DuplicateChecked;
    Ok(report)
}

/// Gate a checked session and build the records to commit.
///
/// An exact duplicate is refused whatever the operator says. A same-date
/// session needs `confirm` to return true; it is not called otherwise.
pub fn prepare_commit<F>(session: &Session, confirm: F) -> Result<CommitRequest, LedgerError>
where
    F: FnOnce(&DuplicateReport) -> bool,
{
    require_stage(session, SessionStage::DuplicateChecked)?;
    let report = session
        .duplicate_report
        .as_ref()
        .ok_or(LedgerError::InvalidStage {
            expected: SessionStage::DuplicateChecked,
            actual: SessionStage::FeeAllocated,
        })?;

    match report.decision {
        DuplicateDecision::ExactDuplicateBlocked => {
            let player = report.conflicting_player.clone().unwrap_or_default();
            log::warn!(
                "Refusing session {} on {}: exact duplicate for {}",
                session.id,
                session.date,
                player
            );
            return Err(LedgerError::ExactDuplicate { player });
        }
        DuplicateDecision::SameDateConfirmRequired => {
            if !confirm(report) {
                log::info!("Session {} on {} cancelled by operator", session.id, session.date);
                return Err(LedgerError::ConfirmationDeclined);
            }
        }
        DuplicateDecision::Clean => {}
    }

    let new_records: Vec<HistoryRecord> = session
        .entries
        .iter()
        .map(|e| HistoryRecord::from_entry(session.date, session.service_fee, e))
        .collect();
    Ok(CommitRequest { new_records })
}

/// Adopt a sink's response. On success history and stats are replaced
/// together with exactly what the sink returned; on failure nothing changes.
pub fn finish_commit(
    ledger: &mut Ledger,
    session: &mut Session,
    response: CommitResponse,
) -> Result<(), LedgerError> {
    require_stage(session, SessionStage::DuplicateChecked)?;
    let players = response.player_stats.len();
    if let Err(e) = ledger.adopt(response) {
        log::error!("Commit of session {} failed: {}", session.id, e);
        return Err(e);
    }
    log::info!(
        "Committed session {} on {}: {} records, {} players",
        session.id,
        session.date,
        session.entries.len(),
        players
    );
    session.stage = SessionStage::Committed;
    Ok(())
}

/// Gate, send to `sink`, and adopt the result in one call.
pub fn commit_session<F, S>(
    ledger: &mut Ledger,
    session: &mut Session,
    confirm: F,
    sink: &mut S,
) -> Result<(), LedgerError>
where
    F: FnOnce(&DuplicateReport) -> bool,
    S: CommitSink + ?Sized,
{
    let request = prepare_commit(session, confirm)?;
    let response = sink.commit(&request);
    finish_commit(ledger, session, response)
}

/// Offline path: commit straight into the ledger through an [`OfflineSink`].
pub fn commit_offline<F>(
    ledger: &mut Ledger,
    session: &mut Session,
    confirm: F,
) -> Result<(), LedgerError>
where
    F: FnOnce(&DuplicateReport) -> bool,
{
    let mut sink = OfflineSink::from_ledger(ledger);
    commit_session(ledger, session, confirm, &mut sink)
}
