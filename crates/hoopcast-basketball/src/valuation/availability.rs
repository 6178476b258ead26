// Season-long availability and recent-activity discounts.

use chrono::NaiveDate;
use hoopcast_core::config::AvailabilityConfig;
use hoopcast_core::records::{PlayerSeasonRecord, RecentGameLine};
use serde::Serialize;

/// Season-availability bucket from `GP / team_GP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AvailabilityFlag {
    Healthy,
    Moderate,
    Risky,
    Fragile,
}

impl AvailabilityFlag {
    pub fn from_rate(rate: f64, cfg: &AvailabilityConfig) -> Self {
        if rate >= cfg.healthy {
            AvailabilityFlag::Healthy
        } else if rate >= cfg.moderate {
            AvailabilityFlag::Moderate
        } else if rate >= cfg.risky {
            AvailabilityFlag::Risky
        } else {
            AvailabilityFlag::Fragile
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AvailabilityFlag::Healthy => "Healthy",
            AvailabilityFlag::Moderate => "Moderate",
            AvailabilityFlag::Risky => "Risky",
            AvailabilityFlag::Fragile => "Fragile",
        }
    }

    pub fn multiplier(&self, cfg: &AvailabilityConfig) -> f64 {
        match self {
            AvailabilityFlag::Healthy => cfg.healthy_multiplier,
            AvailabilityFlag::Moderate => cfg.moderate_multiplier,
            AvailabilityFlag::Risky => cfg.risky_multiplier,
            AvailabilityFlag::Fragile => cfg.fragile_multiplier,
        }
    }
}

/// Whether the player has been on the floor lately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecentActivity {
    Active,
    Questionable,
    Inactive,
}

impl RecentActivity {
    pub fn label(&self) -> &'static str {
        match self {
            RecentActivity::Active => "Active",
            RecentActivity::Questionable => "Questionable",
            RecentActivity::Inactive => "Inactive",
        }
    }

    pub fn penalty(&self, cfg: &AvailabilityConfig) -> f64 {
        match self {
            RecentActivity::Active => 1.0,
            RecentActivity::Questionable => cfg.questionable_penalty,
            RecentActivity::Inactive => cfg.inactive_penalty,
        }
    }
}

const INACTIVE_STATUSES: &[&str] = &["INJ", "O", "OUT", "SUSP", "NA"];
const QUESTIONABLE_STATUSES: &[&str] = &["DTD", "GTD"];

/// Days since the last game that still count as fully active.
const ACTIVE_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Availability {
    pub rate: f64,
    pub flag: AvailabilityFlag,
    pub recent: RecentActivity,
    /// Known only when recent game lines were supplied.
    pub days_since_last_game: Option<i64>,
    /// Tier multiplier times the recent-activity penalty.
    pub multiplier: f64,
}

/// Team games played assumed for players without one: the most games
/// anyone in the table has played.
pub fn default_team_games(players: &[PlayerSeasonRecord]) -> u32 {
    players.iter().map(|p| p.games_played).max().unwrap_or(0)
}

/// `GP / team_GP` clipped to `[0, 1]`.
pub fn availability_rate(games_played: u32, team_games: u32) -> f64 {
    if team_games == 0 {
        return 0.0;
    }
    (games_played as f64 / team_games as f64).clamp(0.0, 1.0)
}

/// Classify recent activity.
///
/// With game lines: days since the most recent one. Without: roster
/// status first, then the season rate.
pub fn recent_activity(
    last_game: Option<NaiveDate>,
    as_of: NaiveDate,
    status: Option<&str>,
    rate: f64,
    cfg: &AvailabilityConfig,
) -> (RecentActivity, Option<i64>) {
    if let Some(date) = last_game {
        let days = (as_of - date).num_days().max(0);
        let activity = if days <= ACTIVE_WINDOW_DAYS {
            RecentActivity::Active
        } else if days <= cfg.inactive_days {
            RecentActivity::Questionable
        } else {
            RecentActivity::Inactive
        };
        return (activity, Some(days));
    }

    let status = status.map(|s| s.trim().to_uppercase()).unwrap_or_default();
    let activity = if INACTIVE_STATUSES.contains(&status.as_str()) {
        RecentActivity::Inactive
    } else if QUESTIONABLE_STATUSES.contains(&status.as_str()) {
        RecentActivity::Questionable
    } else if rate >= cfg.healthy {
        RecentActivity::Active
    } else if rate >= cfg.risky {
        RecentActivity::Questionable
    } else {
        RecentActivity::Inactive
    };
    (activity, None)
}

/// Full availability assessment for one player.
pub fn assess(
    player: &PlayerSeasonRecord,
    recent_lines: &[&RecentGameLine],
    fallback_team_games: u32,
    as_of: NaiveDate,
    cfg: &AvailabilityConfig,
) -> Availability {
    let team_games = player.team_games_played.unwrap_or(fallback_team_games);
    let rate = availability_rate(player.games_played, team_games);
    let flag = AvailabilityFlag::from_rate(rate, cfg);

    let last_game = recent_lines
        .iter()
        .filter(|l| l.is_game_played() && l.game_date <= as_of)
        .map(|l| l.game_date)
        .max();
    let (recent, days_since_last_game) =
        recent_activity(last_game, as_of, player.status.as_deref(), rate, cfg);

    Availability {
        rate,
        flag,
        recent,
        days_since_last_game,
        multiplier: flag.multiplier(cfg) * recent.penalty(cfg),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
