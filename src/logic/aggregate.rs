//! Leaderboard recomputation: a pure fold of the full history into PlayerStats.

use crate::logic::history::latest_date;
use crate::models::{winning_rate_label, HistoryRecord, Outcome, PlayerStat};
use std::collections::{BTreeSet, HashMap};

/// Per-player accumulator. Chips are summed in whole cents so the result does
/// not depend on the order records are folded in.
#[derive(Default)]
struct Tally {
    name: String,
    cents: i128,
    attend: u32,
    wins: u32,
    losses: u32,
    peaces: u32,
}

fn to_cents(chips: f64) -> i128 {
    (chips * 100.0).round() as i128
}

/// Recompute every player's stats from scratch.
///
/// Equivalent to [`recompute_with_baseline`] with an empty baseline.
pub fn recompute(history: &[HistoryRecord], known_players: &[String]) -> Vec<PlayerStat> {
    recompute_with_baseline(&[], history, known_players)
}

/// Recompute every player's stats from a baseline table plus the full history.
///
/// Accumulators are seeded in this order: `known_players`, then players only
/// in `baseline`, then players only in `history` (by name). Each record adds
/// its `final_chips` and counts as a win, loss or peace by the sign of the
/// settled amount. Rows are then stably sorted by cumulative chips descending
/// and ranked 1..n, so ties keep seed order.
pub fn recompute_with_baseline(
    baseline: &[PlayerStat],
    history: &[HistoryRecord],
    known_players: &[String],
) -> Vec<PlayerStat> {
    let mut tallies: Vec<Tally> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut seed = |name: &str, tallies: &mut Vec<Tally>| -> usize {
        *index.entry(name.to_string()).or_insert_with(|| {
            tallies.push(Tally {
                name: name.to_string(),
                ..Tally::default()
            });
            tallies.len() - 1
        })
    };

    for name in known_players {
        seed(name.as_str(), &mut tallies);
    }
    for row in baseline.iter().filter(|b| !b.name.is_empty()) {
        let idx = seed(row.name.as_str(), &mut tallies);
        let t = &mut tallies[idx];
        t.cents = t.cents.saturating_add(to_cents(row.cumulative_chips));
        t.attend += row.attend_count;
        t.wins += row.win_count;
        t.losses += row.lose_count;
        t.peaces += row.peace_count;
    }
    let newcomers: BTreeSet<&str> = history
        .iter()
        .map(|r| r.player.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    for name in newcomers {
        seed(name, &mut tallies);
    }

    for record in history.iter().filter(|r| !r.player.is_empty()) {
        let idx = seed(record.player.as_str(), &mut tallies);
        let t = &mut tallies[idx];
        t.cents = t.cents.saturating_add(to_cents(record.final_chips));
        t.attend += 1;
        match Outcome::from_settled(record.final_chips) {
            Outcome::Win => t.wins += 1,
            Outcome::Lose => t.losses += 1,
            Outcome::Peace => t.peaces += 1,
        }
    }

    tallies.sort_by(|a, b| b.cents.cmp(&a.cents));

    let date = latest_date(history);
    tallies
        .into_iter()
        .enumerate()
        .map(|(i, t)| PlayerStat {
            rank: i as u32 + 1,
            cumulative_chips: t.cents as f64 / 100.0,
            winning_rate: winning_rate_label(t.wins, t.attend),
            attend_count: t.attend,
            win_count: t.wins,
            lose_count: t.losses,
            peace_count: t.peaces,
            date,
            name: t.name,
        })
        .collect()
}
