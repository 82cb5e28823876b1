//! CsvStore against real files in a temp directory.

use poker_ledger_web::{
    check_session, prepare_commit, settle, CommitRequest, CommitSink, CsvStore, HistoryRecord,
    Ledger, Outcome, PlayerStat, SessionBuilder, StorageError,
};
use std::fs;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> CsvStore {
    CsvStore::new(
        dir.path().join("team_building_record.csv"),
        dir.path().join("player_statistics.csv"),
    )
}

fn records(date: &str, fee: f64, chips: &[(&str, i64)]) -> Vec<HistoryRecord> {
    let mut builder = SessionBuilder::new(date, fee);
    for &(name, c) in chips {
        let outcome = if c < 0 { Outcome::Lose } else { Outcome::Win };
        builder.record(name, outcome, c);
    }
    let mut session = settle(&builder.build()).unwrap();
    check_session(&Ledger::new(), &mut session).unwrap();
    prepare_commit(&session, |_| true).unwrap().new_records
}

#[test]
fn missing_tables_load_as_empty_ledger() {
    let dir = TempDir::new().unwrap();
    let ledger = store_in(&dir).load_ledger().unwrap();
    assert!(ledger.history().is_empty());
    assert!(ledger.stats().is_empty());
    assert!(ledger.baseline().is_empty());
}

#[test]
fn append_writes_both_tables() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let new = records("2025-11-05", 10.0, &[("Alice", 90), ("Bob", -60), ("Carol", -30)]);

    let (history, stats) = store.append_records(&new).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(stats[0].name, "Alice");

    let raw = fs::read_to_string(store.records_path()).unwrap();
    let mut lines = raw.lines();
    assert_eq!(
        lines.next(),
        Some("Time,Player,ServiceFee_Rate,Chips,WinOrLose,Value,FinalChips")
    );
    assert_eq!(lines.next(), Some("2025-11-05,Alice,10.0,90.0,Win,90.0,80.00"));

    let reloaded = store.load_ledger().unwrap();
    assert_eq!(reloaded.history(), &history[..]);
    assert_eq!(reloaded.stats(), &stats[..]);
    let alice = reloaded.get_player("Alice").unwrap();
    assert_eq!(alice.cumulative_chips, 80.0);
    assert_eq!(alice.winning_rate, "100.00%");
    assert_eq!(alice.date, chrono::NaiveDate::from_ymd_opt(2025, 11, 5));
}

#[test]
fn second_append_keeps_backups_and_merges() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .append_records(&records("2025-11-05", 0.0, &[("Alice", 50), ("Bob", -50)]))
        .unwrap();
    let first = fs::read_to_string(store.records_path()).unwrap();

    let (history, stats) = store
        .append_records(&records("2025-11-12", 0.0, &[("Alice", -20), ("Bob", 20)]))
        .unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(stats[0].cumulative_chips, 30.0);

    let backup = dir.path().join("team_building_record.csv.bak");
    assert_eq!(fs::read_to_string(backup).unwrap(), first);
    assert!(dir.path().join("player_statistics.csv.bak").exists());
    assert!(!dir.path().join("team_building_record.csv.tmp").exists());
}

#[test]
fn duplicate_batch_is_refused_and_files_untouched() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let batch = records("2025-11-05", 10.0, &[("Alice", 90), ("Bob", -90)]);
    store.append_records(&batch).unwrap();
    let records_before = fs::read_to_string(store.records_path()).unwrap();
    let stats_before = fs::read_to_string(store.stats_path()).unwrap();

    match store.append_records(&batch) {
        Err(StorageError::DuplicateRecord { player, date }) => {
            assert_eq!(player, "Alice");
            assert_eq!(date, "2025-11-05");
        }
        other => panic!("expected duplicate rejection, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(store.records_path()).unwrap(), records_before);
    assert_eq!(fs::read_to_string(store.stats_path()).unwrap(), stats_before);
}

#[test]
fn failed_leaderboard_swap_rolls_back_records() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store
        .append_records(&records("2025-11-05", 0.0, &[("Alice", 50), ("Bob", -50)]))
        .unwrap();
    let records_before = fs::read_to_string(store.records_path()).unwrap();
    let stats_before = fs::read_to_string(store.stats_path()).unwrap();

    // A directory where the leaderboard backup goes makes its swap fail.
    let blocker = dir.path().join("player_statistics.csv.bak");
    fs::create_dir(&blocker).unwrap();

    let next = records("2025-11-12", 0.0, &[("Alice", 10), ("Bob", -10)]);
    assert!(matches!(store.append_records(&next), Err(StorageError::Io(_))));
    assert_eq!(fs::read_to_string(store.records_path()).unwrap(), records_before);
    assert_eq!(fs::read_to_string(store.stats_path()).unwrap(), stats_before);
    assert!(!dir.path().join("team_building_record.csv.tmp").exists());
    assert!(!dir.path().join("player_statistics.csv.tmp").exists());

    // Nothing was half-committed, so the same batch is not a duplicate.
    fs::remove_dir(&blocker).unwrap();
    let (history, stats) = store.append_records(&next).unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(stats[0].cumulative_chips, 60.0);
}

#[test]
fn unreadable_table_is_an_error_not_an_empty_table() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::create_dir(store.stats_path()).unwrap();
    assert!(matches!(
        store.read_stats(),
        Err(StorageError::Io(_)) | Err(StorageError::Csv(_))
    ));
}

#[test]
fn empty_batch_is_refused() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        store_in(&dir).append_records(&[]),
        Err(StorageError::EmptyCommit)
    ));
}

#[test]
fn legacy_rows_are_read_leniently() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.records_path(),
        "Time,Player,ServiceFee_Rate,Chips,WinOrLose,Value,FinalChips\n\
         2024年3月9日,Alice,10,90,水上,90,80\n\
         2024年3月9日,Bob,10,-90,水下,-90,\n\
         ,Ghost,0,0,Win,0,0\n\
         2024-03-16,Carol,0,not-a-number,Win,5,5\n",
    )
    .unwrap();

    let history = store.read_records().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].outcome, Outcome::Win);
    assert_eq!(history[0].final_chips, 80.0);
    assert_eq!(history[1].outcome, Outcome::Lose);
    assert_eq!(history[1].final_chips, 0.0);
    assert_eq!(history[1].date(), chrono::NaiveDate::from_ymd_opt(2024, 3, 9));
}

#[test]
fn blank_or_unknown_outcome_label_keeps_the_row() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.records_path(),
        "Time,Player,ServiceFee_Rate,Chips,WinOrLose,Value,FinalChips\n\
         2024-03-09,Alice,5,30,,30,25\n\
         2024-03-09,Bob,5,-20,draw?,-20,-20\n\
         2024-03-09,Carol,5,-10,Peace,-10,-10\n",
    )
    .unwrap();

    let ledger = store.load_ledger().unwrap();
    let outcomes: Vec<_> = ledger.history().iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, [Outcome::Win, Outcome::Lose, Outcome::Peace]);

    let stats = poker_ledger_web::recompute(ledger.history(), &[]);
    let attended: u32 = stats.iter().map(|p| p.attend_count).sum();
    assert_eq!(attended, 3);
}

#[test]
fn legacy_duplicate_is_caught_across_date_notations() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.records_path(),
        "Time,Player,ServiceFee_Rate,Chips,WinOrLose,Value,FinalChips\n\
         2025年11月5日,Alice,0,40,水上,40,40\n\
         2025年11月5日,Bob,0,-40,水下,-40,-40\n",
    )
    .unwrap();

    let again = records("2025-11-05", 0.0, &[("Bob", -40), ("Alice", 40)]);
    match store.append_records(&again) {
        Err(StorageError::DuplicateRecord { player, .. }) => assert_eq!(player, "Bob"),
        other => panic!("expected duplicate rejection, got {:?}", other),
    }
}

#[test]
fn stats_table_roundtrips_with_blank_counters() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    fs::write(
        store.stats_path(),
        "Player,Ranking,WinChips,AttendCount,WinCount,LoseCount,PeaceCount,WinningRate,Date\n\
         Bob,2,-12.5,3.0,1,2,0,33.33%,\n\
         Alice,1,12.5,,,,,,\n",
    )
    .unwrap();

    let ledger = store.load_ledger().unwrap();
    let names: Vec<_> = ledger.stats().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob"]);
    let bob = ledger.get_player("Bob").unwrap();
    assert_eq!(bob.attend_count, 3);
    assert_eq!(bob.date, None);

    let mut stats = ledger.stats().to_vec();
    stats.push(PlayerStat::new("Dora"));
    store.write_stats(&stats).unwrap();
    assert_eq!(store.read_stats().unwrap(), stats);
}

#[test]
fn roster_order_and_baseline_feed_the_recompute() {
    let dir = TempDir::new().unwrap();
    let baseline_path = dir.path().join("baseline.csv");
    fs::write(
        &baseline_path,
        "Player,Ranking,WinChips,AttendCount,WinCount,LoseCount,PeaceCount,WinningRate\n\
         Old Timer,1,100,4,3,1,0,75.00%\n",
    )
    .unwrap();
    let store = store_in(&dir).with_baseline(&baseline_path);
    store
        .write_stats(&[PlayerStat::new("Zed"), PlayerStat::new("Alice")])
        .unwrap();

    let (_, stats) = store
        .append_records(&records("2025-11-05", 0.0, &[("Alice", 10), ("Bob", -10)]))
        .unwrap();
    let names: Vec<_> = stats.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Old Timer", "Alice", "Zed", "Bob"]);
    assert_eq!(stats[0].attend_count, 4);
    assert_eq!(stats[0].cumulative_chips, 100.0);
}

#[test]
fn store_as_commit_sink_reports_failures_as_rejections() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let request = CommitRequest {
        new_records: records("2025-11-05", 0.0, &[("Alice", 5), ("Bob", -5)]),
    };

    let first = store.commit(&request);
    assert!(first.success);
    assert_eq!(first.game_records.len(), 2);
    assert_eq!(first.player_stats.len(), 2);

    let second = store.commit(&request);
    assert!(!second.success);
    assert!(second.game_records.is_empty());
    assert!(second
        .message
        .unwrap_or_default()
        .contains("already exists"));
}
