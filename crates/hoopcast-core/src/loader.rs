// Boundary loaders: league snapshot JSON plus season-stat and bid-history
// CSV exports.
//
// Provider adapters dump their data in one of these shapes; everything is
// mapped into the fixed record types in `records` here so the engine never
// sees raw provider rows.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::records::{HistoricalBidRecord, LeagueSnapshot, PlayerSeasonRecord};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV rows (private)
// ---------------------------------------------------------------------------

/// Identity columns of the season-stats export. Every other column is a
/// per-game stat keyed by its header.
const IDENTITY_COLUMNS: &[&str] = &[
    "player_id",
    "name",
    "team",
    "games_played",
    "team_games_played",
    "minutes",
    "status",
];

#[derive(Debug, Deserialize)]
struct RawBid {
    #[serde(alias = "player", alias = "Player")]
    player_name: String,
    #[serde(alias = "bid", alias = "Bid")]
    amount: f64,
    #[serde(default)]
    team: String,
    #[serde(default)]
    timestamp: Option<String>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_season_stats_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerSeasonRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let (Some(name_col), Some(gp_col), Some(min_col)) =
        (column("name"), column("games_played"), column("minutes"))
    else {
        warn!("season stats CSV is missing name/games_played/minutes columns");
        return Ok(Vec::new());
    };
    let id_col = column("player_id");
    let team_col = column("team");
    let team_gp_col = column("team_games_played");
    let status_col = column("status");

    let mut players = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed season row {}: {}", row + 1, e);
                continue;
            }
        };
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::trim);

        let name = field(Some(name_col)).unwrap_or_default().to_string();
        if name.is_empty() {
            warn!("skipping season row {}: empty name", row + 1);
            continue;
        }
        let games_played = match field(Some(gp_col)).map(str::parse::<f64>) {
            Some(Ok(v)) if v.is_finite() && v >= 0.0 => v.round() as u32,
            _ => {
                warn!("skipping '{}': invalid games_played", name);
                continue;
            }
        };
        let minutes = match field(Some(min_col)).map(str::parse::<f64>) {
            Some(Ok(v)) if v.is_finite() => v,
            _ => {
                warn!("skipping '{}': invalid minutes", name);
                continue;
            }
        };
        let team_games_played = field(team_gp_col)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v.round() as u32);

        let mut stats = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if IDENTITY_COLUMNS.contains(&header.as_str()) {
                continue;
            }
            // Blank cells mean "not reported" and stay out of the map.
            match record.get(idx).map(str::trim) {
                Some("") | None => {}
                Some(raw) => match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => {
                        stats.insert(header.clone(), v);
                    }
                    _ => warn!("'{}': ignoring non-numeric {} value '{}'", name, header, raw),
                },
            }
        }

        players.push(PlayerSeasonRecord {
            player_id: field(id_col)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| name.clone()),
            name,
            team: field(team_col).unwrap_or_default().to_string(),
            games_played,
            team_games_played,
            minutes,
            status: field(status_col)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            stats,
        });
    }
    Ok(players)
}

fn load_bids_from_reader<R: Read>(rdr: R) -> Result<Vec<HistoricalBidRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut bids = Vec::new();
    for result in reader.deserialize::<RawBid>() {
        match result {
            Ok(raw) => {
                let player_name = raw.player_name.trim().to_string();
                if player_name.is_empty() {
                    warn!("skipping bid row with empty player name");
                    continue;
                }
                if !raw.amount.is_finite() || raw.amount < 0.0 {
                    warn!("skipping bid for '{}': invalid amount {}", player_name, raw.amount);
                    continue;
                }
                let timestamp = raw
                    .timestamp
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .and_then(|s| match DateTime::parse_from_rfc3339(s) {
                        Ok(ts) => Some(ts.with_timezone(&Utc)),
                        Err(e) => {
                            warn!("bid for '{}': unparseable timestamp '{}': {}", player_name, s, e);
                            None
                        }
                    });
                bids.push(HistoricalBidRecord {
                    player_name,
                    amount: raw.amount.round() as u32,
                    team: raw.team.trim().to_string(),
                    timestamp,
                });
            }
            Err(e) => {
                warn!("skipping malformed bid row: {}", e);
            }
        }
    }
    Ok(bids)
}

fn load_snapshot_from_reader<R: Read>(rdr: R) -> Result<LeagueSnapshot, serde_json::Error> {
    serde_json::from_reader(rdr)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load season per-game stats from a CSV export.
pub fn load_season_stats(path: &Path) -> Result<Vec<PlayerSeasonRecord>, LoadError> {
    let file = open(path)?;
    let players = load_season_stats_from_reader(file).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if players.is_empty() {
        return Err(LoadError::Validation(format!(
            "{} produced zero valid player rows",
            path.display()
        )));
    }
    info!("loaded {} season rows from {}", players.len(), path.display());
    Ok(players)
}

/// Load historical add transactions from a CSV export. An empty history is
/// valid (new league).
pub fn load_bid_history(path: &Path) -> Result<Vec<HistoricalBidRecord>, LoadError> {
    let file = open(path)?;
    let bids = load_bids_from_reader(file).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    info!("loaded {} historical bids from {}", bids.len(), path.display());
    Ok(bids)
}

/// Load a complete league snapshot from JSON.
pub fn load_snapshot(path: &Path) -> Result<LeagueSnapshot, LoadError> {
    let file = open(path)?;
    let snapshot = load_snapshot_from_reader(std::io::BufReader::new(file)).map_err(|e| {
        LoadError::Json {
            path: path.display().to_string(),
            source: e,
        }
    })?;
    if snapshot.players.is_empty() {
        return Err(LoadError::Validation(format!(
            "snapshot {} contains no players",
            path.display()
        )));
    }
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
