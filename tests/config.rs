use poker_ledger_web::ServerConfig;
use std::collections::HashMap;
use std::path::PathBuf;

fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServerConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn empty_environment_gives_defaults() {
    let config = config_from(&[]);
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.records_file, "team_building_record.csv");
    assert_eq!(config.stats_file, "player_statistics.csv");
    assert_eq!(config.baseline_file, None);
    assert_eq!(config.static_dir, PathBuf::from("static"));
}

#[test]
fn variables_override_defaults() {
    let config = config_from(&[
        ("HOST", "127.0.0.1"),
        ("PORT", " 9090 "),
        ("DATA_DIR", "/srv/poker"),
        ("BASELINE_FILE", "calculated_player_statistics.csv"),
    ]);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9090);
    assert_eq!(config.data_dir, PathBuf::from("/srv/poker"));
    assert_eq!(
        config.baseline_file.as_deref(),
        Some("calculated_player_statistics.csv")
    );
}

#[test]
fn blank_or_bad_values_fall_back() {
    let config = config_from(&[("PORT", "eighty"), ("HOST", "   "), ("BASELINE_FILE", "")]);
    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.baseline_file, None);
}

#[test]
fn store_paths_live_under_data_dir() {
    let config = config_from(&[("DATA_DIR", "data"), ("RECORDS_FILE", "records.csv")]);
    let store = config.store();
    assert_eq!(store.records_path(), PathBuf::from("data/records.csv"));
    assert_eq!(store.stats_path(), PathBuf::from("data/player_statistics.csv"));
}
