//! PlayerStat: one leaderboard row per known player.

use crate::models::columns::{lenient_f64, lenient_u32};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative statistics of one player, as persisted in the statistics table.
///
/// Everything except `name` is derived from history by the stats aggregator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    #[serde(rename = "Player")]
    pub name: String,
    /// 1-based position by `cumulative_chips` descending.
    #[serde(rename = "Ranking", default, deserialize_with = "lenient_u32")]
    pub rank: u32,
    #[serde(rename = "WinChips", default, deserialize_with = "lenient_f64")]
    pub cumulative_chips: f64,
    #[serde(rename = "AttendCount", default, deserialize_with = "lenient_u32")]
    pub attend_count: u32,
    #[serde(rename = "WinCount", default, deserialize_with = "lenient_u32")]
    pub win_count: u32,
    #[serde(rename = "LoseCount", default, deserialize_with = "lenient_u32")]
    pub lose_count: u32,
    #[serde(rename = "PeaceCount", default, deserialize_with = "lenient_u32")]
    pub peace_count: u32,
    /// `win_count / attend_count` as a percentage string, e.g. "66.67%".
    #[serde(rename = "WinningRate", default)]
    pub winning_rate: String,
    /// Latest session date folded into this row.
    #[serde(rename = "Date", default)]
    pub date: Option<NaiveDate>,
}

impl PlayerStat {
    /// A player with all counters at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rank: 0,
            cumulative_chips: 0.0,
            attend_count: 0,
            win_count: 0,
            lose_count: 0,
            peace_count: 0,
            winning_rate: winning_rate_label(0, 0),
            date: None,
        }
    }

    /// Win ratio in [0, 1]; 0 for a player who never attended.
    pub fn win_ratio(&self) -> f64 {
        if self.attend_count == 0 {
            0.0
        } else {
            self.win_count as f64 / self.attend_count as f64
        }
    }

    /// `attend == win + lose + peace`.
    pub fn counts_consistent(&self) -> bool {
        self.attend_count == self.win_count + self.lose_count + self.peace_count
    }
}

/// Percentage label with two decimals ("0.00%" when `attend` is 0).
pub fn winning_rate_label(wins: u32, attend: u32) -> String {
    let rate = if attend == 0 {
        0.0
    } else {
        wins as f64 / attend as f64 * 100.0
    };
    format!("{:.2}%", rate)
}
