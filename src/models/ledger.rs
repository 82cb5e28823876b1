//! Ledger: the committed history and the leaderboard derived from it.

use crate::models::player::PlayerStat;
use crate::models::record::HistoryRecord;
use crate::models::session::{SessionStage, ValidationError};
use serde::{Deserialize, Serialize};

/// Errors that can occur while managing the roster or settling a session.
#[derive(Clone, Debug, PartialEq)]
pub enum LedgerError {
    /// Player name is empty after trimming.
    EmptyPlayerName,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName(String),
    /// Session is not at the stage this step requires.
    InvalidStage {
        expected: SessionStage,
        actual: SessionStage,
    },
    /// Session input rejected.
    Validation(ValidationError),
    /// History already holds this (date, player, chips); the commit is refused.
    ExactDuplicate { player: String },
    /// Operator declined to add a second session on an already-recorded date.
    ConfirmationDeclined,
    /// Commit sink did not acknowledge; local state is unchanged.
    RemoteCommitFailure { message: String },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::EmptyPlayerName => write!(f, "Please enter a player name"),
            LedgerError::DuplicatePlayerName(name) => {
                write!(f, "Player \"{}\" already exists", name)
            }
            LedgerError::InvalidStage { expected, actual } => write!(
                f,
                "Session is {:?}, expected {:?} for this action",
                actual, expected
            ),
            LedgerError::Validation(e) => write!(f, "{}", e),
            LedgerError::ExactDuplicate { player } => write!(
                f,
                "Duplicate record found for player {} with same date and chips value",
                player
            ),
            LedgerError::ConfirmationDeclined => write!(f, "Update cancelled by user"),
            LedgerError::RemoteCommitFailure { message } => {
                write!(f, "Commit failed: {}", message)
            }
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(e: ValidationError) -> Self {
        LedgerError::Validation(e)
    }
}

/// Payload handed to a commit sink.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub new_records: Vec<HistoryRecord>,
}

/// Authoritative post-commit state returned by a commit sink.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub success: bool,
    #[serde(default)]
    pub game_records: Vec<HistoryRecord>,
    #[serde(default)]
    pub player_stats: Vec<PlayerStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommitResponse {
    pub fn accepted(game_records: Vec<HistoryRecord>, player_stats: Vec<PlayerStat>) -> Self {
        Self {
            success: true,
            game_records,
            player_stats,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// In-memory store: committed history plus the leaderboard derived from it.
///
/// History and stats are only ever replaced together (see [`Ledger::adopt`]),
/// so a reader never sees one updated without the other.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    history: Vec<HistoryRecord>,
    stats: Vec<PlayerStat>,
    /// Statistics carried from before the history began.
    baseline: Vec<PlayerStat>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger over already loaded tables.
    pub fn with_tables(
        history: Vec<HistoryRecord>,
        stats: Vec<PlayerStat>,
        baseline: Vec<PlayerStat>,
    ) -> Self {
        Self {
            history,
            stats,
            baseline,
        }
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn stats(&self) -> &[PlayerStat] {
        &self.stats
    }

    pub fn baseline(&self) -> &[PlayerStat] {
        &self.baseline
    }

    /// Roster names in leaderboard order.
    pub fn known_players(&self) -> Vec<String> {
        self.stats.iter().map(|p| p.name.clone()).collect()
    }

    pub fn get_player(&self, name: &str) -> Option<&PlayerStat> {
        self.stats.iter().find(|p| p.name == name)
    }

    /// Add a player with zeroed stats. Names must be unique (case-insensitive).
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<&PlayerStat, LedgerError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(LedgerError::EmptyPlayerName);
        }
        let is_duplicate = self
            .stats
            .iter()
            .any(|p| p.name.to_lowercase() == name_trimmed.to_lowercase());
        if is_duplicate {
            return Err(LedgerError::DuplicatePlayerName(name_trimmed.to_string()));
        }
        let mut player = PlayerStat::new(name_trimmed);
        player.rank = self.stats.len() as u32 + 1;
        self.stats.push(player);
        Ok(&self.stats[self.stats.len() - 1])
    }

    /// Pure local commit: history with `new_records` appended, and the stats
    /// recomputed from it. Does not touch `self`.
    pub fn apply_commit(
        &self,
        new_records: &[HistoryRecord],
    ) -> (Vec<HistoryRecord>, Vec<PlayerStat>) {
        let mut history = self.history.clone();
        history.extend_from_slice(new_records);
        let stats = crate::logic::recompute_with_baseline(
            &self.baseline,
            &history,
            &self.known_players(),
        );
        (history, stats)
    }

    /// Adopt a commit sink's response as the new source of truth.
    ///
    /// On success history and stats are replaced verbatim, together. On
    /// failure nothing changes.
    pub fn adopt(&mut self, response: CommitResponse) -> Result<(), LedgerError> {
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Server update failed".to_string());
            return Err(LedgerError::RemoteCommitFailure { message });
        }
        self.replace(response.game_records, response.player_stats);
        Ok(())
    }

    /// Swap in a new history and leaderboard together.
    pub(crate) fn replace(&mut self, history: Vec<HistoryRecord>, stats: Vec<PlayerStat>) {
        self.history = history;
        self.stats = stats;
    }
}
