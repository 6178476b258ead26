// Injury-report severity multipliers.
//
// The most severe reported status decides the multiplier. Blurb text can
// push an "out" player toward elimination (surgery, no timetable) or toward
// a return (practicing, expected back). Suspensions are scaled against the
// games the player's team has left in the analysed window.

use std::collections::BTreeMap;

use hoopcast_core::names::{loose_name_match, normalize_name};
use hoopcast_core::records::{InjuryReport, InjuryStatus};
use serde::Serialize;

/// Blurb phrases that mean a long-term absence.
const EXTENDED_ABSENCE_KEYWORDS: &[&str] = &[
    "rest of the season",
    "season-ending",
    "remainder of the season",
    "torn acl",
    "torn achilles",
    "surgery",
    "no timetable",
    "indefinitely",
];

/// Blurb phrases that mean a return is close.
const RETURN_SOON_KEYWORDS: &[&str] = &[
    "return after the all-star break",
    "return to action",
    "progressed to",
    "on-court workouts",
    "scrimmages",
    "expected to return",
    "nearing a return",
    "day-to-day",
    "game-time decision",
];

const OUT_MULTIPLIER: f64 = 0.10;
const OUT_EXTENDED_MULTIPLIER: f64 = 0.05;
const OUT_RETURNING_MULTIPLIER: f64 = 0.40;
const DAY_TO_DAY_MULTIPLIER: f64 = 0.90;
const DAY_TO_DAY_RETURNING_MULTIPLIER: f64 = 0.95;
const UNKNOWN_SUSPENSION_MULTIPLIER: f64 = 0.05;

pub fn status_label(status: InjuryStatus) -> &'static str {
    match status {
        InjuryStatus::OutForSeason => "OUT-SEASON",
        InjuryStatus::Out => "OUT",
        InjuryStatus::DayToDay => "DTD",
        InjuryStatus::Suspended => "SUSP",
    }
}

/// `(extended_absence, return_imminent)` keyword hits in a blurb.
pub fn blurb_signals(blurb: &str) -> (bool, bool) {
    let text = blurb.to_lowercase();
    let extended = EXTENDED_ABSENCE_KEYWORDS.iter().any(|kw| text.contains(kw));
    let returning = RETURN_SOON_KEYWORDS.iter().any(|kw| text.contains(kw));
    (extended, returning)
}

/// Suspension multiplier.
///
/// With `remaining_games > 0` the share of remaining games the player will
/// be available for is banded; otherwise the suspension length alone is.
pub fn suspension_multiplier(suspension_games: Option<u32>, remaining_games: u32) -> f64 {
    let Some(games) = suspension_games else {
        return UNKNOWN_SUSPENSION_MULTIPLIER;
    };

    if remaining_games == 0 {
        return match games {
            10.. => 0.0,
            5..=9 => 0.03,
            2..=4 => 0.15,
            _ => 0.85,
        };
    }

    let available = remaining_games.saturating_sub(games);
    let fraction = available as f64 / remaining_games as f64;
    if available == 0 {
        0.0
    } else if fraction <= 0.15 {
        0.03
    } else if fraction <= 0.35 {
        0.10
    } else if fraction <= 0.60 {
        0.30
    } else if fraction <= 0.85 {
        0.60
    } else {
        0.85
    }
}

/// Resolved injury signal for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjuryAssessment {
    pub player_name: String,
    pub status: InjuryStatus,
    pub label: &'static str,
    pub multiplier: f64,
    pub extended_absence: bool,
    pub return_imminent: bool,
    pub suspension_games: Option<u32>,
    pub blurb: String,
}

impl InjuryAssessment {
    pub fn from_report(report: &InjuryReport, remaining_games: u32) -> Self {
        let (text_extended, text_returning) = blurb_signals(&report.blurb);
        // The structured long-term tag outranks blurb wording.
        let extended = report.extended_absence || text_extended;
        let returning = report.return_imminent || text_returning;

        let multiplier = match report.status {
            InjuryStatus::OutForSeason => 0.0,
            InjuryStatus::Out if extended => OUT_EXTENDED_MULTIPLIER,
            InjuryStatus::Out if returning => OUT_RETURNING_MULTIPLIER,
            InjuryStatus::Out => OUT_MULTIPLIER,
            InjuryStatus::DayToDay if returning => DAY_TO_DAY_RETURNING_MULTIPLIER,
            InjuryStatus::DayToDay => DAY_TO_DAY_MULTIPLIER,
            InjuryStatus::Suspended => {
                suspension_multiplier(report.suspension_games, remaining_games)
            }
        };

        InjuryAssessment {
            player_name: report.player_name.clone(),
            status: report.status,
            label: status_label(report.status),
            multiplier,
            extended_absence: extended,
            return_imminent: returning,
            suspension_games: report.suspension_games,
            blurb: report.blurb.clone(),
        }
    }

    /// One-line note such as `OUT - Left ankle sprain, re-evaluated...`.
    pub fn note(&self, max_blurb_len: usize) -> String {
        if self.blurb.is_empty() {
            return self.label.to_string();
        }
        let blurb: String = if self.blurb.chars().count() > max_blurb_len {
            let cut: String = self.blurb.chars().take(max_blurb_len.saturating_sub(3)).collect();
            format!("{cut}...")
        } else {
            self.blurb.clone()
        };
        format!("{} - {}", self.label, blurb)
    }
}

/// Normalized-name index over the injury report.
#[derive(Debug, Clone, Default)]
pub struct InjuryLookup {
    reports: BTreeMap<String, InjuryReport>,
}

impl InjuryLookup {
    /// Index reports by normalized name. When a player is listed more than
    /// once the most severe report (lowest multiplier) is kept.
    pub fn build(reports: &[InjuryReport]) -> Self {
        let mut indexed: BTreeMap<String, InjuryReport> = BTreeMap::new();
        for report in reports {
            let key = normalize_name(&report.player_name);
            let severity = InjuryAssessment::from_report(report, 0).multiplier;
            let replace = match indexed.get(&key) {
                Some(existing) => severity < InjuryAssessment::from_report(existing, 0).multiplier,
                None => true,
            };
            if replace {
                indexed.insert(key, report.clone());
            }
        }
        InjuryLookup { reports: indexed }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Exact normalized match, then same last name and first initial.
    pub fn find(&self, player_name: &str) -> Option<&InjuryReport> {
        let norm = normalize_name(player_name);
        if let Some(report) = self.reports.get(&norm) {
            return Some(report);
        }
        self.reports
            .iter()
            .find(|(key, _)| loose_name_match(&norm, key))
            .map(|(_, report)| report)
    }

    /// Assessment for a player, `None` when healthy.
    pub fn assess(&self, player_name: &str, remaining_games: u32) -> Option<InjuryAssessment> {
        self.find(player_name)
            .map(|report| InjuryAssessment::from_report(report, remaining_games))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
