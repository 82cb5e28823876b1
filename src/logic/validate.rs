//! Session validation: raw entries in, accepted session or the first failing rule out.

use crate::models::{
    parse_canonical_date, Outcome, Session, SessionEntry, ValidatedEntry, ValidationError,
};

/// Validate one session's raw input.
///
/// Rules, in order (first failure wins):
/// 1. `date` parses in a known encoding.
/// 2. `service_fee` is a finite, non-negative number.
/// 3. At least one entry is attending.
/// 4. Each attending entry's declared outcome matches its chip sign
///    (positive needs Win, negative needs Lose, zero is always allowed).
/// 5. Attending chips sum to exactly 0.
///
/// Zero-chip entries are normalized to Peace. Fee shares are left at 0 and
/// net chips equal chips until [`allocate_fees`](crate::logic::allocate_fees) runs.
pub fn validate_session(
    date: &str,
    service_fee: f64,
    entries: &[SessionEntry],
) -> Result<Session, ValidationError> {
    let date = parse_canonical_date(date).ok_or(ValidationError::InvalidDate)?;

    if !service_fee.is_finite() || service_fee < 0.0 {
        return Err(ValidationError::InvalidFee);
    }

    let attending: Vec<&SessionEntry> = entries.iter().filter(|e| e.attending).collect();
    if attending.is_empty() {
        return Err(ValidationError::NoParticipants);
    }

    if let Some(e) = attending.iter().find(|e| !outcome_matches_chips(e)) {
        return Err(ValidationError::OutcomeMismatch {
            player: e.player.clone(),
        });
    }

    let sum: i128 = attending.iter().map(|e| i128::from(e.chips)).sum();
    if sum != 0 {
        return Err(ValidationError::UnbalancedChips { sum });
    }

    let validated = attending
        .into_iter()
        .map(|e| ValidatedEntry {
            player: e.player.clone(),
            outcome: if e.chips == 0 { Outcome::Peace } else { e.outcome },
            chips: e.chips,
            service_fee: 0.0,
            net_chips: e.chips as f64,
        })
        .collect();

    Ok(Session::new(date, service_fee, validated))
}

fn outcome_matches_chips(entry: &SessionEntry) -> bool {
    match entry.chips.signum() {
        1 => entry.outcome == Outcome::Win,
        -1 => entry.outcome == Outcome::Lose,
        _ => true,
    }
}
