//! Duplicate-session detection against committed history.

use crate::logic::history::records_on;
use crate::models::{DuplicateDecision, DuplicateReport, HistoryRecord, Session};

/// Classify `session` against `history`.
///
/// - No record on the session date: Clean.
/// - Some attending player already has a record on that date with the same
///   chips: ExactDuplicateBlocked, naming the first such player in entry order.
/// - Otherwise, records on that date: SameDateConfirmRequired.
pub fn check_duplicates(session: &Session, history: &[HistoryRecord]) -> DuplicateReport {
    let same_date = records_on(history, session.date);
    if same_date.is_empty() {
        return DuplicateReport {
            decision: DuplicateDecision::Clean,
            conflicting_player: None,
            same_date_records: 0,
        };
    }

    let conflict = session.entries.iter().find(|e| {
        same_date
            .iter()
            .any(|r| r.player == e.player && r.chips == e.chips as f64)
    });

    match conflict {
        Some(e) => DuplicateReport {
            decision: DuplicateDecision::ExactDuplicateBlocked,
            conflicting_player: Some(e.player.clone()),
            same_date_records: same_date.len(),
        },
        None => DuplicateReport {
            decision: DuplicateDecision::SameDateConfirmRequired,
            conflicting_player: None,
            same_date_records: same_date.len(),
        },
    }
}

/// First new record whose (date, player, chips) already exists in `history`.
///
/// Rows whose date is in no known encoding never match.
pub fn find_exact_duplicate<'a>(
    new_records: &'a [HistoryRecord],
    history: &[HistoryRecord],
) -> Option<&'a HistoryRecord> {
    new_records.iter().find(|new| {
        let Some(day) = new.date() else {
            return false;
        };
        history.iter().any(|old| {
            old.player == new.player && old.chips == new.chips && old.date() == Some(day)
        })
    })
}
