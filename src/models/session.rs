//! One game session: raw operator entries, the validated/settled session, and its lifecycle stage.

use crate::models::player::PlayerStat;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pending session.
pub type SessionId = Uuid;

/// Result of one player in one session.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    #[serde(alias = "水上")]
    Win,
    #[serde(alias = "水下")]
    Lose,
    /// Broke even. Only produced by normalization of zero-chip entries.
    Peace,
}

impl Outcome {
    /// Parse a persisted label, including the legacy 水上 / 水下 pair.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Win" | "水上" => Some(Outcome::Win),
            "Lose" | "水下" => Some(Outcome::Lose),
            "Peace" => Some(Outcome::Peace),
            _ => None,
        }
    }

    /// Outcome implied by the sign of a settled amount.
    pub fn from_settled(amount: f64) -> Self {
        if amount > 0.0 {
            Outcome::Win
        } else if amount < 0.0 {
            Outcome::Lose
        } else {
            Outcome::Peace
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Lose => write!(f, "Lose"),
            Outcome::Peace => write!(f, "Peace"),
        }
    }
}

/// Why a session was rejected. Checked in this order; the first failure wins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// Date missing or in no known encoding.
    InvalidDate,
    /// Service fee negative or not a number.
    InvalidFee,
    /// Nobody is marked as attending.
    NoParticipants,
    /// Declared outcome contradicts the chip sign.
    OutcomeMismatch { player: String },
    /// Chips of attending players do not sum to zero.
    UnbalancedChips { sum: i128 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidDate => write!(f, "Please enter a valid game date"),
            ValidationError::InvalidFee => write!(f, "Please enter a valid service fee"),
            ValidationError::NoParticipants => {
                write!(f, "At least one player must participate in the game")
            }
            ValidationError::OutcomeMismatch { player } => {
                write!(f, "{}'s chips value does not match win/lose status", player)
            }
            ValidationError::UnbalancedChips { sum } => {
                write!(f, "Chips must sum to 0 (current sum: {})", sum)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// One player's raw input for a pending session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    pub player: String,
    #[serde(default)]
    pub attending: bool,
    /// Outcome as declared by the operator (Win or Lose).
    #[serde(default)]
    pub outcome: Outcome,
    /// Whole-chip delta as entered.
    #[serde(default)]
    pub chips: i64,
}

impl SessionEntry {
    pub fn new(player: impl Into<String>, attending: bool, outcome: Outcome, chips: i64) -> Self {
        Self {
            player: player.into(),
            attending,
            outcome,
            chips,
        }
    }
}

/// Raw, not yet validated, input for one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub date: String,
    pub service_fee: f64,
    pub entries: Vec<SessionEntry>,
}

impl SessionDraft {
    /// Run the session validator over this draft.
    pub fn validate(&self) -> Result<Session, ValidationError> {
        crate::logic::validate_session(&self.date, self.service_fee, &self.entries)
    }
}

/// Collects per-player entries for one session.
#[derive(Clone, Debug)]
pub struct SessionBuilder {
    date: String,
    service_fee: f64,
    entries: Vec<SessionEntry>,
}

impl SessionBuilder {
    pub fn new(date: impl Into<String>, service_fee: f64) -> Self {
        Self {
            date: date.into(),
            service_fee,
            entries: Vec::new(),
        }
    }

    /// One non-attending entry per known player, in roster order.
    pub fn from_roster(date: impl Into<String>, service_fee: f64, roster: &[PlayerStat]) -> Self {
        let mut builder = Self::new(date, service_fee);
        builder.entries = roster
            .iter()
            .map(|p| SessionEntry::new(p.name.clone(), false, Outcome::Win, 0))
            .collect();
        builder
    }

    /// Mutable entry for `player`, appended (not attending) if unknown.
    fn entry_mut(&mut self, player: &str) -> &mut SessionEntry {
        let idx = match self.entries.iter().position(|e| e.player == player) {
            Some(idx) => idx,
            None => {
                self.entries
                    .push(SessionEntry::new(player, false, Outcome::Win, 0));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    /// Toggle attendance. Leaving resets the entry to Win / 0 chips.
    pub fn attend(&mut self, player: &str, attending: bool) -> &mut Self {
        let entry = self.entry_mut(player);
        entry.attending = attending;
        if !attending {
            entry.outcome = Outcome::Win;
            entry.chips = 0;
        }
        self
    }

    /// Record a player's declared outcome and chips; marks them attending.
    pub fn record(&mut self, player: &str, outcome: Outcome, chips: i64) -> &mut Self {
        let entry = self.entry_mut(player);
        entry.attending = true;
        entry.outcome = outcome;
        entry.chips = chips;
        self
    }

    /// Add or replace a whole entry.
    pub fn entry(&mut self, entry: SessionEntry) -> &mut Self {
        let name = entry.player.clone();
        *self.entry_mut(&name) = entry;
        self
    }

    pub fn build(&self) -> SessionDraft {
        SessionDraft {
            date: self.date.clone(),
            service_fee: self.service_fee,
            entries: self.entries.clone(),
        }
    }
}

/// A SessionEntry after validation, annotated with its fee share once allocated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedEntry {
    pub player: String,
    /// Normalized: zero-chip entries are Peace.
    pub outcome: Outcome,
    pub chips: i64,
    /// 0 for non-winners and before allocation.
    pub service_fee: f64,
    /// `chips - service_fee`.
    pub net_chips: f64,
}

/// Where a session is in its lifecycle. Only Committed has touched history.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    #[default]
    Validated,
    FeeAllocated,
    DuplicateChecked,
    Committed,
}

/// Outcome of checking a session against history.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateDecision {
    /// No record on this date.
    Clean,
    /// Records exist on this date; the operator must confirm before committing.
    SameDateConfirmRequired,
    /// A record with the same date, player and chips exists; never committed.
    ExactDuplicateBlocked,
}

/// DuplicateChecker verdict plus the details shown to the operator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub decision: DuplicateDecision,
    /// First attending player found exactly duplicated (ExactDuplicateBlocked only).
    pub conflicting_player: Option<String>,
    /// Number of history records already on the session date.
    pub same_date_records: usize,
}

/// A validated session: one entry per attending player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub date: NaiveDate,
    /// Total fee pool.
    pub service_fee: f64,
    pub entries: Vec<ValidatedEntry>,
    pub stage: SessionStage,
    /// Set once the session has been checked against history.
    pub duplicate_report: Option<DuplicateReport>,
}

impl Session {
    pub fn new(date: NaiveDate, service_fee: f64, entries: Vec<ValidatedEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            service_fee,
            entries,
            stage: SessionStage::Validated,
            duplicate_report: None,
        }
    }

    /// Sum of pre-fee chips (0 for every accepted session). Widened so it cannot overflow.
    pub fn chips_sum(&self) -> i128 {
        self.entries.iter().map(|e| i128::from(e.chips)).sum()
    }

    /// Sum of allocated fee shares.
    pub fn allocated_fee(&self) -> f64 {
        self.entries.iter().map(|e| e.service_fee).sum()
    }
}
