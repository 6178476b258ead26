// Integration tests for the core crate's file boundary: shipped config
// files and the path-based loaders.

use std::path::{Path, PathBuf};

use hoopcast_core::config::{load_config, load_config_from, validate, BidStrategy, EngineConfig};
use hoopcast_core::loader::{load_bid_history, load_season_stats, load_snapshot, LoadError};
use hoopcast_core::names::normalize_name;

// ===========================================================================
// Helpers
// ===========================================================================

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hoopcast_core_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, file: &str, content: &str) -> PathBuf {
    let path = dir.join(file);
    std::fs::write(&path, content).unwrap();
    path
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

// ===========================================================================
// Config files
// ===========================================================================

#[test]
fn shipped_defaults_are_valid_toml() {
    for file in ["league.toml", "strategy.toml"] {
        let content = std::fs::read_to_string(workspace_root().join("defaults").join(file)).unwrap();
        let parsed: Result<toml::Value, _> = toml::from_str(&content);
        assert!(parsed.is_ok(), "defaults/{file} is not valid TOML: {:?}", parsed.err());
    }
}

#[test]
fn first_run_initializes_and_loads_config() {
    let base = temp_dir("first_run");
    let defaults = base.join("defaults");
    std::fs::create_dir_all(&defaults).unwrap();
    for file in ["league.toml", "strategy.toml"] {
        std::fs::copy(workspace_root().join("defaults").join(file), defaults.join(file)).unwrap();
    }

    let config = load_config(&base).unwrap();
    assert!(base.join("config/strategy.toml").is_file());
    assert!(validate(&config).is_ok());
    assert_eq!(config.categories.len(), 9);
    assert_eq!(config.bidding.strategy, BidStrategy::Competitive);

    // Edits to config/ survive a second load.
    let league = std::fs::read_to_string(base.join("config/league.toml")).unwrap();
    std::fs::write(
        base.join("config/league.toml"),
        league.replace("punt = []", "punt = [\"TO\"]"),
    )
    .unwrap();
    let punted = load_config(&base).unwrap();
    assert!(punted.category("TOV").unwrap().punted);
    assert_eq!(punted.active_categories().count(), 8);

    let _ = std::fs::remove_dir_all(&base);
}

#[test]
fn config_dir_without_defaults_still_loads() {
    let base = temp_dir("config_only");
    let config_dir = base.join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::copy(
        workspace_root().join("defaults/league.toml"),
        config_dir.join("league.toml"),
    )
    .unwrap();

    // An empty strategy.toml leaves every section at its default.
    write(&config_dir, "strategy.toml", "");
    let config = load_config_from(&base).unwrap();
    assert_eq!(config.bidding, EngineConfig::default().bidding);
    let _ = std::fs::remove_dir_all(&base);
}

// ===========================================================================
// Loaders
// ===========================================================================

#[test]
fn season_csv_round_trips_into_records() {
    let dir = temp_dir("season");
    let path = write(
        &dir,
        "season.csv",
        "player_id,name,team,games_played,minutes,PTS,REB,FG_PCT\n\
         1,Avery Stone,BOS,30,31.5,21.4,5.2,0.481\n\
         2,,LAL,20,25.0,10.0,3.0,0.450\n\
         3,Nico Vale,MIA,abc,20.0,8.0,2.0,0.400\n\
         4,Reed Moss,DEN,12,18.0,7.5,6.1,\n",
    );
    let players = load_season_stats(&path).unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].stat("PTS"), Some(21.4));
    assert_eq!(players[1].stat("FG_PCT"), None);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn season_csv_with_no_usable_rows_is_rejected() {
    let dir = temp_dir("season_empty");
    let path = write(&dir, "season.csv", "name,games_played,minutes\n,10,20\n");
    let err = load_season_stats(&path).unwrap_err();
    assert!(matches!(err, LoadError::Validation(_)));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_bid_history_is_valid() {
    let dir = temp_dir("bids_empty");
    let path = write(&dir, "bids.csv", "player_name,amount,team,timestamp\n");
    assert!(load_bid_history(&path).unwrap().is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn snapshot_without_players_is_rejected() {
    let dir = temp_dir("snapshot_empty");
    let path = write(&dir, "snapshot.json", r#"{"as_of": "2026-01-14", "players": []}"#);
    assert!(matches!(load_snapshot(&path), Err(LoadError::Validation(_))));

    let bad = write(&dir, "bad.json", "{ not json");
    assert!(matches!(load_snapshot(&bad), Err(LoadError::Json { .. })));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn names_match_across_sources() {
    assert_eq!(normalize_name("Nikola Jokić"), normalize_name("nikola jokic"));
    assert_eq!(normalize_name("P.J. Washington"), normalize_name("PJ Washington"));
    assert_eq!(normalize_name("Shai Gilgeous-Alexander"), "shai gilgeous alexander");
}
