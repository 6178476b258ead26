// Weekly add/drop limit.

use chrono::{Datelike, Duration, NaiveDate};
use hoopcast_core::names::normalize_name;
use hoopcast_core::records::{GameWeek, HistoricalBidRecord};
use serde::Serialize;

/// First day of the fantasy week holding `as_of`: the league's game week
/// when one covers it, otherwise the calendar Monday.
pub fn fantasy_week_start(as_of: NaiveDate, game_weeks: &[GameWeek]) -> NaiveDate {
    game_weeks
        .iter()
        .find(|w| w.start <= as_of && as_of <= w.end)
        .map(|w| w.start)
        .unwrap_or_else(|| as_of - Duration::days(as_of.weekday().num_days_from_monday() as i64))
}

/// My adds with a timestamp on or after `week_start`. Records without a
/// timestamp are not counted.
pub fn count_transactions_since(
    bids: &[HistoricalBidRecord],
    my_team: &str,
    week_start: NaiveDate,
) -> u32 {
    let mine = normalize_name(my_team);
    bids.iter()
        .filter(|b| normalize_name(&b.team) == mine)
        .filter(|b| b.timestamp.is_some_and(|ts| ts.date_naive() >= week_start))
        .count() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionLimit {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
    pub at_limit: bool,
    pub message: String,
}

impl TransactionLimit {
    pub fn check(used: u32, limit: u32) -> Self {
        let remaining = limit.saturating_sub(used);
        let at_limit = remaining == 0;
        let message = match remaining {
            0 => format!("Weekly transaction limit reached ({used}/{limit}). Resets Monday."),
            1 => format!("1 transaction remaining this week ({used}/{limit})"),
            n => format!("{n} transactions remaining this week ({used}/{limit})"),
        };
        TransactionLimit {
            used,
            limit,
            remaining,
            at_limit,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
