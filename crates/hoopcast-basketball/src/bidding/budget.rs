// FAAB budget health: spending pace plus standing among the league's
// remaining budgets.

use chrono::{Datelike, NaiveDate};
use hoopcast_core::config::FaabConfig;
use hoopcast_core::names::normalize_name;
use hoopcast_core::records::{LeagueSettings, ManagerBudget};
use serde::Serialize;
use tracing::debug;

use crate::valuation::round_to;

const MIN_BUDGET_FACTOR: f64 = 0.5;
const MAX_BUDGET_FACTOR: f64 = 2.0;
const RELATIVE_BASE: f64 = 0.5;
const RELATIVE_SPAN: f64 = 1.5;

/// Regular season end used when the league reports no week numbers.
const SEASON_END_MONTH: u32 = 4;
const SEASON_END_DAY: u32 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetHealth {
    Flush,
    Healthy,
    Tight,
    Critical,
}

impl BudgetHealth {
    pub fn from_factor(factor: f64) -> Self {
        if factor >= 1.3 {
            BudgetHealth::Flush
        } else if factor >= 0.9 {
            BudgetHealth::Healthy
        } else if factor >= 0.6 {
            BudgetHealth::Tight
        } else {
            BudgetHealth::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetHealth::Flush => "FLUSH",
            BudgetHealth::Healthy => "HEALTHY",
            BudgetHealth::Tight => "TIGHT",
            BudgetHealth::Critical => "CRITICAL",
        }
    }
}

/// Where my remaining budget sits among the league's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueStanding {
    /// 1 = most money left.
    pub rank: usize,
    pub size: usize,
    /// Share of other managers with strictly less remaining.
    pub percentile: f64,
    pub relative_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub remaining_budget: u32,
    pub total_budget: u32,
    pub weeks_remaining: u32,
    pub weekly_budget: f64,
    pub pace_factor: f64,
    pub standing: Option<LeagueStanding>,
    /// `max(pace, relative)` clamped to `[0.5, 2.0]`.
    pub budget_factor: f64,
    pub status: BudgetHealth,
    pub is_playoffs: bool,
    pub max_single_bid: u32,
}

/// `(weeks_remaining, is_playoffs)` from the league's week numbers, or
/// estimated from the calendar when they are missing.
pub fn weeks_remaining(settings: &LeagueSettings, as_of: NaiveDate) -> (u32, bool) {
    let is_playoffs = matches!(
        (settings.current_week, settings.playoff_start_week),
        (Some(cur), Some(playoff)) if cur >= playoff
    );

    let weeks = match (settings.current_week, settings.end_week) {
        (Some(cur), Some(end)) => match settings.playoff_start_week {
            Some(playoff) if !is_playoffs => playoff.saturating_sub(cur).max(1),
            _ => (end + 1).saturating_sub(cur).max(1),
        },
        _ => {
            let year = if as_of.month() <= 6 { as_of.year() } else { as_of.year() + 1 };
            let days_left = NaiveDate::from_ymd_opt(year, SEASON_END_MONTH, SEASON_END_DAY)
                .map(|end| (end - as_of).num_days())
                .unwrap_or(0)
                .max(1);
            ((days_left / 7) as u32).max(1)
        }
    };
    (weeks, is_playoffs)
}

/// Standing of `my_team` among `league`; `None` without other managers.
pub fn league_standing(remaining: u32, my_team: &str, league: &[ManagerBudget]) -> Option<LeagueStanding> {
    let mine = normalize_name(my_team);
    let others: Vec<u32> = league
        .iter()
        .filter(|m| normalize_name(&m.team) != mine)
        .map(|m| m.remaining)
        .collect();
    if others.is_empty() {
        return None;
    }
    let below = others.iter().filter(|r| **r < remaining).count();
    let above = others.iter().filter(|r| **r > remaining).count();
    let percentile = below as f64 / others.len() as f64;
    Some(LeagueStanding {
        rank: above + 1,
        size: others.len() + 1,
        percentile: round_to(percentile, 3),
        relative_factor: round_to(RELATIVE_BASE + percentile * RELATIVE_SPAN, 2),
    })
}

pub fn compute_budget_status(
    remaining: u32,
    settings: &LeagueSettings,
    as_of: NaiveDate,
    my_team: &str,
    league: &[ManagerBudget],
    cfg: &FaabConfig,
) -> BudgetStatus {
    let (weeks, is_playoffs) = weeks_remaining(settings, as_of);
    let total_budget = if is_playoffs {
        cfg.budget_playoffs
    } else {
        cfg.budget_regular_season
    };

    let ideal_weekly = total_budget as f64 / weeks as f64;
    let weekly_budget = remaining as f64 / weeks as f64;
    let pace_factor = round_to(
        (weekly_budget / ideal_weekly.max(1.0)).clamp(MIN_BUDGET_FACTOR, MAX_BUDGET_FACTOR),
        2,
    );

    let standing = league_standing(remaining, my_team, league);
    let best = standing
        .as_ref()
        .map_or(pace_factor, |s| pace_factor.max(s.relative_factor));
    let budget_factor = round_to(best.clamp(MIN_BUDGET_FACTOR, MAX_BUDGET_FACTOR), 2);
    debug!(
        "budget: ${} over {} weeks, pace {} relative {:?} -> {}",
        remaining,
        weeks,
        pace_factor,
        standing.as_ref().map(|s| s.relative_factor),
        budget_factor
    );

    BudgetStatus {
        remaining_budget: remaining,
        total_budget,
        weeks_remaining: weeks,
        weekly_budget: round_to(weekly_budget, 1),
        pace_factor,
        standing,
        budget_factor,
        status: BudgetHealth::from_factor(budget_factor),
        is_playoffs,
        max_single_bid: (remaining as f64 * cfg.max_bid_percent).floor() as u32,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
