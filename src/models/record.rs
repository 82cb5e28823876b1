//! HistoryRecord (one persisted settlement row) and calendar-date normalization.

use crate::models::columns::{lenient_f64, lenient_outcome, round_cents, two_decimals};
use crate::models::session::{Outcome, ValidatedEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Canonical textual form of a session date.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date in either known encoding: `YYYY-MM-DD` or the legacy
/// `YYYY年M月D日` notation. Returns None for anything else.
pub fn parse_canonical_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, CANONICAL_DATE_FORMAT) {
        return Some(date);
    }
    parse_legacy_date(s)
}

fn parse_legacy_date(s: &str) -> Option<NaiveDate> {
    let (year, rest) = s.split_once('年')?;
    let (month, rest) = rest.split_once('月')?;
    let day = rest.strip_suffix('日')?;
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let day: u32 = day.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Format a date in the canonical `YYYY-MM-DD` form.
pub fn format_canonical_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// One player's settled result for one session, as persisted in the records table.
///
/// `time` is kept exactly as it was read; legacy rows may use the alternate
/// date notation, so comparisons always go through [`HistoryRecord::date`].
///
/// A row whose `WinOrLose` label is blank or unknown takes its outcome from
/// the sign of `FinalChips`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryRecord {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Player")]
    pub player: String,
    /// The session's whole fee pool, repeated on every row of the session.
    #[serde(rename = "ServiceFee_Rate")]
    pub service_fee: f64,
    /// Pre-fee chip delta.
    #[serde(rename = "Chips")]
    pub chips: f64,
    #[serde(rename = "WinOrLose")]
    pub outcome: Outcome,
    /// Duplicate of `chips`, kept for the legacy layout.
    #[serde(rename = "Value")]
    pub value: f64,
    /// Post-fee net, always written with two decimals.
    #[serde(rename = "FinalChips", serialize_with = "two_decimals")]
    pub final_chips: f64,
}

/// Persisted row as read, before the outcome is settled.
#[derive(Deserialize)]
struct RecordRow {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Player")]
    player: String,
    #[serde(rename = "ServiceFee_Rate", default, deserialize_with = "lenient_f64")]
    service_fee: f64,
    #[serde(rename = "Chips", default, deserialize_with = "lenient_f64")]
    chips: f64,
    #[serde(rename = "WinOrLose", default, deserialize_with = "lenient_outcome")]
    outcome: Option<Outcome>,
    #[serde(rename = "Value", default, deserialize_with = "lenient_f64")]
    value: f64,
    #[serde(rename = "FinalChips", default, deserialize_with = "lenient_f64")]
    final_chips: f64,
}

impl<'de> Deserialize<'de> for HistoryRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let row = RecordRow::deserialize(deserializer)?;
        Ok(Self {
            outcome: row
                .outcome
                .unwrap_or_else(|| Outcome::from_settled(row.final_chips)),
            time: row.time,
            player: row.player,
            service_fee: row.service_fee,
            chips: row.chips,
            value: row.value,
            final_chips: row.final_chips,
        })
    }
}

impl HistoryRecord {
    /// Build the persisted row for one settled entry of a session.
    pub fn from_entry(date: NaiveDate, service_fee: f64, entry: &ValidatedEntry) -> Self {
        let chips = entry.chips as f64;
        Self {
            time: format_canonical_date(date),
            player: entry.player.clone(),
            service_fee,
            chips,
            outcome: entry.outcome,
            value: chips,
            final_chips: round_cents(entry.net_chips),
        }
    }

    /// Normalized session date, or None if `time` is in no known encoding.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_canonical_date(&self.time)
    }

    /// Fee this player paid in the session (never negative).
    pub fn service_fee_paid(&self) -> f64 {
        (self.chips - self.final_chips).max(0.0)
    }
}
