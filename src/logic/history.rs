//! Retrospective queries over history records.

use crate::models::{parse_canonical_date, HistoryRecord};
use chrono::NaiveDate;

/// Records of the session held on `date`, in their original order.
///
/// `date` may use either known encoding, as may each record's `Time`. An
/// unparseable date matches nothing.
pub fn find_by_date<'a>(history: &'a [HistoryRecord], date: &str) -> Vec<&'a HistoryRecord> {
    match parse_canonical_date(date) {
        Some(day) => records_on(history, day),
        None => Vec::new(),
    }
}

/// Records whose normalized date equals `day`, in their original order.
pub fn records_on(history: &[HistoryRecord], day: NaiveDate) -> Vec<&HistoryRecord> {
    history.iter().filter(|r| r.date() == Some(day)).collect()
}

/// Most recent session date in history, ignoring rows in no known encoding.
pub fn latest_date(history: &[HistoryRecord]) -> Option<NaiveDate> {
    history.iter().filter_map(HistoryRecord::date).max()
}
