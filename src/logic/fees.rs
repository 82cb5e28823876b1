//! Service fee allocation: winners share the fee pool in proportion to their winnings.

use crate::models::{LedgerError, Session, SessionStage, ValidatedEntry};

/// Annotate each entry with its share of `service_fee` and its net chips.
///
/// With `W` the sum of positive chips, a winner pays `service_fee * chips / W`.
/// Losers and Peace entries pay nothing. If nobody won (`W == 0`) every share is 0.
pub fn allocate_fees(entries: &[ValidatedEntry], service_fee: f64) -> Vec<ValidatedEntry> {
    let winners_pool: i128 = entries
        .iter()
        .filter(|e| e.chips > 0)
        .map(|e| i128::from(e.chips))
        .sum();

    entries
        .iter()
        .map(|e| {
            let share = if e.chips > 0 && winners_pool > 0 {
                service_fee * (e.chips as f64 / winners_pool as f64)
            } else {
                0.0
            };
            ValidatedEntry {
                service_fee: share,
                net_chips: e.chips as f64 - share,
                ..e.clone()
            }
        })
        .collect()
}

/// Allocate the session's fee pool across its winners (Validated -> FeeAllocated).
pub fn allocate_session_fees(session: &mut Session) -> Result<(), LedgerError> {
    if session.stage != SessionStage::Validated {
        return Err(LedgerError::InvalidStage {
            expected: SessionStage::Validated,
            actual: session.stage,
        });
    }
    session.entries = allocate_fees(&session.entries, session.service_fee);
    session.stage = SessionStage::FeeAllocated;
    Ok(())
}
