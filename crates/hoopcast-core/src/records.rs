// Collaborator record types.
//
// Everything the engine reads arrives through these structs. Stats, injury,
// schedule and league providers map whatever shape they fetch into these
// fixed records before a run; the engine never inspects provider payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Player stats
// ---------------------------------------------------------------------------

/// One season row per player. Category values are per-game averages keyed
/// by stat key (`FG_PCT`, `FGA`, `PTS`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRecord {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub team: String,
    pub games_played: u32,
    /// Games the player's team has played. Falls back to the most games
    /// played by anyone in the table when absent.
    #[serde(default)]
    pub team_games_played: Option<u32>,
    /// Minutes per game.
    pub minutes: f64,
    /// Provider roster status (`INJ`, `O`, `DTD`, ...). Empty when healthy.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

impl PlayerSeasonRecord {
    /// Look up a raw per-game value. Non-finite values count as missing.
    pub fn stat(&self, key: &str) -> Option<f64> {
        self.stats.get(key).copied().filter(|v| v.is_finite())
    }
}

/// A single game's box-score line (totals, not averages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGameLine {
    pub player_id: String,
    pub game_date: NaiveDate,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

impl RecentGameLine {
    pub fn stat(&self, key: &str) -> f64 {
        self.stats.get(key).copied().unwrap_or(0.0)
    }

    /// A line only counts as a game played if the player recorded
    /// points, rebounds or assists.
    pub fn is_game_played(&self) -> bool {
        self.stat("PTS") > 0.0 || self.stat("REB") > 0.0 || self.stat("AST") > 0.0
    }
}

// ---------------------------------------------------------------------------
// Injury and news
// ---------------------------------------------------------------------------

/// Reported availability status from the injury feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryStatus {
    OutForSeason,
    Out,
    DayToDay,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub player_name: String,
    #[serde(default)]
    pub team: String,
    pub status: InjuryStatus,
    #[serde(default)]
    pub blurb: String,
    /// Suspension length in games, when the feed states it.
    #[serde(default)]
    pub suspension_games: Option<u32>,
    /// Structured "return is imminent" flag from the feed.
    #[serde(default)]
    pub return_imminent: bool,
    /// Structured long-term absence tag (e.g. a fantasy "OUT" designation).
    #[serde(default)]
    pub extended_absence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub player_name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub text: String,
}

/// Cross-league ownership movement for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipTrend {
    pub player_name: String,
    pub percent_owned: f64,
    pub percent_owned_delta: f64,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
}

/// Fantasy week boundaries as published by the league platform. Extended
/// weeks (e.g. around the All-Star break) can span more than seven days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameWeek {
    pub week: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ---------------------------------------------------------------------------
// League and bidding
// ---------------------------------------------------------------------------

/// One past add transaction. A bid of 0 is a free pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBidRecord {
    pub player_name: String,
    pub amount: u32,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerBudget {
    pub team: String,
    pub remaining: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub num_teams: Option<u32>,
    #[serde(default)]
    pub current_week: Option<u32>,
    #[serde(default)]
    pub end_week: Option<u32>,
    #[serde(default)]
    pub playoff_start_week: Option<u32>,
    #[serde(default)]
    pub uses_faab: Option<bool>,
    /// Platform stat ids the league scores.
    #[serde(default)]
    pub stat_ids: Vec<u32>,
    #[serde(default)]
    pub max_weekly_adds: Option<u32>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything one analysis run consumes. Built once by the data-provider
/// layer and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    /// Date the snapshot was taken. All "recent" and "this week" math is
    /// relative to it so repeated runs on the same snapshot agree.
    pub as_of: NaiveDate,
    pub players: Vec<PlayerSeasonRecord>,
    #[serde(default)]
    pub recent_games: Vec<RecentGameLine>,
    #[serde(default)]
    pub injuries: Vec<InjuryReport>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub trends: Vec<OwnershipTrend>,
    #[serde(default)]
    pub schedule: Vec<ScheduledGame>,
    #[serde(default)]
    pub game_weeks: Vec<GameWeek>,
    #[serde(default)]
    pub bids: Vec<HistoricalBidRecord>,
    #[serde(default)]
    pub settings: LeagueSettings,
    /// Names on the analysing manager's roster.
    #[serde(default)]
    pub my_roster: Vec<String>,
    /// Names rostered anywhere in the league (including `my_roster`).
    #[serde(default)]
    pub owned_players: Vec<String>,
    #[serde(default)]
    pub my_team: String,
    #[serde(default)]
    pub my_remaining_budget: Option<u32>,
    #[serde(default)]
    pub league_budgets: Vec<ManagerBudget>,
    /// Adds already made this week, when the league reports it directly.
    /// Otherwise counted from `bids`.
    #[serde(default)]
    pub my_transactions_this_week: Option<u32>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
