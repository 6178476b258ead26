// Upcoming-schedule game density.
//
// Teams with more games in the coming fantasy weeks accumulate more
// counting stats, so their players get a multiplier above 1.0. Near weeks
// count more than far ones.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use hoopcast_core::config::ScheduleConfig;
use hoopcast_core::records::{GameWeek, ScheduledGame};
use serde::Serialize;

use super::round_to;

/// Feed abbreviations that differ from the tricodes used elsewhere.
const TEAM_ABBR_ALIASES: &[(&str, &str)] = &[
    ("GS", "GSW"),
    ("NO", "NOP"),
    ("NY", "NYK"),
    ("SA", "SAS"),
    ("WSH", "WAS"),
    ("PHO", "PHX"),
];

/// Uppercase tricode with known aliases resolved.
pub fn normalize_team_abbr(abbr: &str) -> String {
    let upper = abbr.trim().to_uppercase();
    TEAM_ABBR_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(upper)
}

// ---------------------------------------------------------------------------
// Week windows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekWindow {
    pub week: Option<u32>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    pub fn label(&self) -> String {
        let range = format!("{} - {}", self.start.format("%b %d"), self.end.format("%b %d"));
        match self.week {
            Some(week) => format!("Week {week}: {range}"),
            None => range,
        }
    }
}

fn monday_of(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// The next `weeks_ahead` fantasy weeks starting with the one holding
/// `as_of`.
///
/// Published game weeks are used when the current week can be placed
/// (extended All-Star weeks span more than seven days). Weeks past the
/// published data, or all weeks when none is published, are Monday to
/// Sunday calendar weeks.
pub fn upcoming_weeks(
    as_of: NaiveDate,
    weeks_ahead: usize,
    current_week: Option<u32>,
    game_weeks: &[GameWeek],
) -> Vec<WeekWindow> {
    let current_week = current_week.or_else(|| {
        game_weeks
            .iter()
            .find(|gw| gw.start <= as_of && as_of <= gw.end)
            .map(|gw| gw.week)
    });
    let base_monday = monday_of(as_of);

    (0..weeks_ahead)
        .map(|i| {
            let week = current_week.map(|w| w + i as u32);
            let published = week.and_then(|w| game_weeks.iter().find(|gw| gw.week == w));
            match published {
                Some(gw) => WeekWindow {
                    week,
                    start: gw.start,
                    end: gw.end,
                },
                None => {
                    let start = base_monday + Duration::weeks(i as i64);
                    WeekWindow {
                        week,
                        start,
                        end: start + Duration::days(6),
                    }
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSchedule {
    pub window: WeekWindow,
    pub game_counts: BTreeMap<String, u32>,
    pub game_dates: BTreeMap<String, Vec<NaiveDate>>,
    /// Mean over teams playing this week, one decimal.
    pub avg_games: f64,
    pub max_games: u32,
    pub min_games: u32,
}

impl WeekSchedule {
    fn build(games: &[ScheduledGame], window: WeekWindow) -> Self {
        let mut game_counts: BTreeMap<String, u32> = BTreeMap::new();
        let mut game_dates: BTreeMap<String, Vec<NaiveDate>> = BTreeMap::new();
        for game in games
            .iter()
            .filter(|g| window.start <= g.date && g.date <= window.end)
        {
            for team in [&game.home, &game.away] {
                let team = normalize_team_abbr(team);
                *game_counts.entry(team.clone()).or_insert(0) += 1;
                game_dates.entry(team).or_default().push(game.date);
            }
        }
        for dates in game_dates.values_mut() {
            dates.sort();
        }

        let avg_games = if game_counts.is_empty() {
            0.0
        } else {
            let total: u32 = game_counts.values().sum();
            round_to(total as f64 / game_counts.len() as f64, 1)
        };

        WeekSchedule {
            window,
            max_games: game_counts.values().copied().max().unwrap_or(0),
            min_games: game_counts.values().copied().min().unwrap_or(0),
            game_counts,
            game_dates,
            avg_games,
        }
    }

    pub fn games_for(&self, team: &str) -> u32 {
        self.game_counts.get(team).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleAnalysis {
    pub weeks: Vec<WeekSchedule>,
    /// Games per team across every analysed week.
    pub total_game_counts: BTreeMap<String, u32>,
    pub avg_games_per_week: f64,
}

impl ScheduleAnalysis {
    pub fn build(games: &[ScheduledGame], windows: Vec<WeekWindow>, cfg: &ScheduleConfig) -> Self {
        let weeks: Vec<WeekSchedule> = windows
            .into_iter()
            .map(|w| WeekSchedule::build(games, w))
            .collect();

        let mut total_game_counts: BTreeMap<String, u32> = BTreeMap::new();
        for week in &weeks {
            for (team, count) in &week.game_counts {
                *total_game_counts.entry(team.clone()).or_insert(0) += count;
            }
        }

        let avg_games_per_week = if total_game_counts.is_empty() || weeks.is_empty() {
            cfg.default_avg_games
        } else {
            let total: u32 = total_game_counts.values().sum();
            round_to(
                total as f64 / total_game_counts.len() as f64 / weeks.len() as f64,
                2,
            )
        };

        ScheduleAnalysis {
            weeks,
            total_game_counts,
            avg_games_per_week,
        }
    }

    /// No games fell inside any analysed week.
    pub fn is_empty(&self) -> bool {
        self.total_game_counts.is_empty()
    }

    pub fn games_this_week(&self, team: &str) -> u32 {
        let team = normalize_team_abbr(team);
        self.weeks.first().map(|w| w.games_for(&team)).unwrap_or(0)
    }

    /// Average games for the current week, falling back to the per-week
    /// average across the window.
    pub fn avg_games_this_week(&self) -> f64 {
        match self.weeks.first() {
            Some(week) if !week.game_counts.is_empty() => week.avg_games,
            _ => self.avg_games_per_week,
        }
    }

    pub fn remaining_games(&self, team: &str) -> u32 {
        let team = normalize_team_abbr(team);
        self.total_game_counts.get(&team).copied().unwrap_or(0)
    }

    /// `(games, avg_games)` per analysed week, when the team plays in any.
    pub fn team_weeks(&self, team: &str) -> Option<Vec<(u32, f64)>> {
        let team = normalize_team_abbr(team);
        if !self.total_game_counts.contains_key(&team) {
            return None;
        }
        Some(
            self.weeks
                .iter()
                .map(|w| (w.games_for(&team), w.avg_games))
                .collect(),
        )
    }

    /// Schedule multiplier for a team; 1.0 when there is no schedule.
    pub fn multiplier(&self, team: &str, cfg: &ScheduleConfig) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        let weeks = self.team_weeks(team);
        schedule_multiplier(
            self.games_this_week(team),
            self.avg_games_this_week(),
            weeks.as_deref(),
            cfg,
        )
    }
}

/// Multiplier centred on 1.0: `1 + weight × delta`, three decimals.
///
/// With more than one week of `(games, avg)` data the delta is the
/// decay-weighted mean `Σ decay^i (g_i − avg_i) / Σ decay^i`; otherwise it
/// is `games_this_week − avg_games`.
pub fn schedule_multiplier(
    games_this_week: u32,
    avg_games: f64,
    week_counts: Option<&[(u32, f64)]>,
    cfg: &ScheduleConfig,
) -> f64 {
    let delta = match week_counts {
        Some(weeks) if weeks.len() > 1 => {
            let mut weighted = 0.0;
            let mut total_weight = 0.0;
            for (i, (games, avg)) in weeks.iter().enumerate() {
                let w = cfg.week_decay.powi(i as i32);
                weighted += w * (*games as f64 - avg);
                total_weight += w;
            }
            if total_weight > 0.0 {
                weighted / total_weight
            } else {
                weighted
            }
        }
        _ => games_this_week as f64 - avg_games,
    };
    round_to(1.0 + cfg.weight * delta, 3)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn game(d: NaiveDate, home: &str, away: &str) -> ScheduledGame {
        ScheduledGame {
            date: d,
            home: home.into(),
            away: away.into(),
        }
    }

    #[test]
    fn single_week_delta() {
        let cfg = ScheduleConfig::default();
        let mult = schedule_multiplier(5, 3.5, None, &cfg);
        assert!(approx_eq(mult, 1.15, 1e-9));
        assert!(approx_eq(schedule_multiplier(2, 3.5, None, &cfg), 0.85, 1e-9));
    }

    #[test]
    fn one_week_of_data_uses_single_week_formula() {
        let cfg = ScheduleConfig::default();
        let mult = schedule_multiplier(4, 3.0, Some(&[(4, 3.0)]), &cfg);
        assert!(approx_eq(mult, 1.1, 1e-9));
    }

    #[test]
    fn multi_week_decay_weights_near_weeks() {
        let cfg = ScheduleConfig::default();
        // deltas +1, -1, -1 with weights 1, 0.5, 0.25 → (1 - 0.5 - 0.25) / 1.75
        let weeks = [(4, 3.0), (2, 3.0), (2, 3.0)];
        let expected = round_to(1.0 + 0.1 * (0.25 / 1.75), 3);
        assert!(approx_eq(schedule_multiplier(4, 3.0, Some(&weeks), &cfg), expected, 1e-12));
        assert!(approx_eq(expected, 1.014, 1e-12));
    }

    #[test]
    fn team_aliases_resolve() {
        assert_eq!(normalize_team_abbr(" gs "), "GSW");
        assert_eq!(normalize_team_abbr("PHO"), "PHX");
        assert_eq!(normalize_team_abbr("bos"), "BOS");
    }

    #[test]
    fn calendar_weeks_start_on_monday() {
        // 2026-01-14 is a Wednesday.
        let weeks = upcoming_weeks(date(2026, 1, 14), 3, None, &[]);
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].start, date(2026, 1, 12));
        assert_eq!(weeks[0].end, date(2026, 1, 18));
        assert_eq!(weeks[2].start, date(2026, 1, 26));
        assert!(weeks.iter().all(|w| w.week.is_none()));
    }

    #[test]
    fn published_weeks_take_precedence() {
        let game_weeks = vec![
            GameWeek { week: 17, start: date(2026, 2, 9), end: date(2026, 2, 22) },
            GameWeek { week: 18, start: date(2026, 2, 23), end: date(2026, 3, 1) },
        ];
        let weeks = upcoming_weeks(date(2026, 2, 12), 3, None, &game_weeks);
        assert_eq!(weeks[0].week, Some(17));
        assert_eq!(weeks[0].end, date(2026, 2, 22));
        assert_eq!(weeks[1].start, date(2026, 2, 23));
        // Week 19 is not published: calendar estimate two weeks out.
        assert_eq!(weeks[2].week, Some(19));
        assert_eq!(weeks[2].start, date(2026, 2, 23));
        assert_eq!(weeks[0].label(), "Week 17: Feb 09 - Feb 22");
    }

    #[test]
    fn analysis_counts_games_per_team_and_week() {
        let cfg = ScheduleConfig::default();
        let windows = upcoming_weeks(date(2026, 1, 12), 2, None, &[]);
        let games = vec![
            game(date(2026, 1, 12), "BOS", "NY"),
            game(date(2026, 1, 14), "BOS", "GS"),
            game(date(2026, 1, 16), "NYK", "BOS"),
            game(date(2026, 1, 20), "GSW", "BOS"),
            game(date(2026, 2, 20), "BOS", "LAL"),
        ];
        let analysis = ScheduleAnalysis::build(&games, windows, &cfg);

        let week0 = &analysis.weeks[0];
        assert_eq!(week0.games_for("BOS"), 3);
        assert_eq!(week0.games_for("NYK"), 2);
        assert_eq!(week0.games_for("GSW"), 1);
        assert!(approx_eq(week0.avg_games, 2.0, 1e-12));
        assert_eq!(week0.max_games, 3);
        assert_eq!(week0.min_games, 1);
        assert_eq!(week0.game_dates["BOS"].len(), 3);

        assert_eq!(analysis.remaining_games("bos"), 4);
        assert_eq!(analysis.games_this_week("GS"), 1);
        // 8 team-games, 3 teams, 2 weeks.
        assert!(approx_eq(analysis.avg_games_per_week, 1.33, 1e-12));
        assert!(analysis.team_weeks("LAL").is_none());
    }

    #[test]
    fn empty_schedule_is_neutral() {
        let cfg = ScheduleConfig::default();
        let windows = upcoming_weeks(date(2026, 1, 12), 3, None, &[]);
        let analysis = ScheduleAnalysis::build(&[], windows, &cfg);
        assert!(analysis.is_empty());
        assert_eq!(analysis.avg_games_per_week, 3.5);
        assert_eq!(analysis.multiplier("BOS", &cfg), 1.0);
    }
}
