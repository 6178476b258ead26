// End-to-end analysis run over one league snapshot.
//
// Everything is recomputed from the snapshot and config passed in; nothing
// is cached between runs, so identical inputs give identical reports.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use hoopcast_core::config::{validate, ConfigError, EngineConfig};
use hoopcast_core::names::normalize_name;
use hoopcast_core::records::{
    LeagueSnapshot, NewsItem, OwnershipTrend, PlayerSeasonRecord, RecentGameLine,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bidding::budget::{compute_budget_status, BudgetStatus};
use crate::bidding::history::BidHistoryAnalysis;
use crate::bidding::limits::{count_transactions_since, fantasy_week_start, TransactionLimit};
use crate::bidding::suggest::{suggest_batch, BidSuggestion};
use crate::bidding::tiers::TierTable;
use crate::valuation::adjust::{compose, rank_recommendations, AdjustedRecommendation, CandidateSignals};
use crate::valuation::availability::{assess, default_team_games};
use crate::valuation::hot::{hot_pickup, trending_signal};
use crate::valuation::injury::InjuryLookup;
use crate::valuation::needs::{
    droppable_candidates, need_score, DropCandidate, RosterImpact, RosterStrength, TeamNeeds,
};
use crate::valuation::news::player_news_signal;
use crate::valuation::schedule::{upcoming_weeks, ScheduleAnalysis};
use crate::valuation::zscore::{normalize, NormalizeError, NormalizedScore};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Output of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub as_of: NaiveDate,
    pub league_name: String,
    /// Players in the z-score fitting pool.
    pub pool_size: usize,
    /// Unowned eligible players considered before hard exclusions.
    pub candidates_considered: usize,
    /// Candidates removed by a zero injury multiplier.
    pub excluded: Vec<String>,
    pub recommendations: Vec<AdjustedRecommendation>,
    pub team_needs: TeamNeeds,
    pub weakest_categories: Vec<String>,
    pub roster_strength: RosterStrength,
    pub droppables: Vec<DropCandidate>,
    /// Top recommendation swapped for each scored droppable.
    pub roster_impacts: Vec<RosterImpact>,
    pub schedule: ScheduleAnalysis,
    pub bid_history: BidHistoryAnalysis,
    pub budget: Option<BudgetStatus>,
    pub transaction_limit: TransactionLimit,
    pub bid_suggestions: Vec<BidSuggestion>,
}

/// Lookup tables over the snapshot, keyed the way each signal matches.
struct SnapshotIndex<'a> {
    players: BTreeMap<&'a str, &'a PlayerSeasonRecord>,
    recent: BTreeMap<&'a str, Vec<&'a RecentGameLine>>,
    news: BTreeMap<String, Vec<&'a NewsItem>>,
    trends: BTreeMap<String, &'a OwnershipTrend>,
}

impl<'a> SnapshotIndex<'a> {
    fn build(snapshot: &'a LeagueSnapshot) -> Self {
        let players = snapshot
            .players
            .iter()
            .map(|p| (p.player_id.as_str(), p))
            .collect();
        let mut recent: BTreeMap<&str, Vec<&RecentGameLine>> = BTreeMap::new();
        for line in &snapshot.recent_games {
            recent.entry(line.player_id.as_str()).or_default().push(line);
        }
        let mut news: BTreeMap<String, Vec<&NewsItem>> = BTreeMap::new();
        for item in &snapshot.news {
            news.entry(normalize_name(&item.player_name)).or_default().push(item);
        }
        let trends = snapshot
            .trends
            .iter()
            .map(|t| (normalize_name(&t.player_name), t))
            .collect();
        SnapshotIndex {
            players,
            recent,
            news,
            trends,
        }
    }

    fn recent_lines(&self, player_id: &str) -> &[&'a RecentGameLine] {
        self.recent.get(player_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn articles(&self, name_key: &str) -> &[&'a NewsItem] {
        self.news.get(name_key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Run the full valuation and bidding pipeline.
///
/// Steps:
/// 1. Normalize every player against the eligible pool.
/// 2. Split out my roster and the unowned eligible candidates.
/// 3. Roster needs and strength from my roster's z-scores.
/// 4. Per-candidate signals (availability, injury, schedule, news, hot,
///    trending), composed and ranked.
/// 5. Tiers from the ranked pool, bid history, budget, weekly limit and
///    bid suggestions for the top candidates.
pub fn run_analysis(
    snapshot: &LeagueSnapshot,
    config: &EngineConfig,
) -> Result<AnalysisReport, EngineError> {
    validate(config)?;
    let as_of = snapshot.as_of;
    let normalization = normalize(&snapshot.players, config)?;
    let index = SnapshotIndex::build(snapshot);

    // ---- Ownership ----
    let owned: BTreeSet<String> = snapshot
        .owned_players
        .iter()
        .chain(snapshot.my_roster.iter())
        .map(|n| normalize_name(n))
        .collect();
    let by_name: BTreeMap<String, &NormalizedScore> = normalization
        .scores
        .iter()
        .map(|s| (normalize_name(&s.name), s))
        .collect();

    let mut roster: Vec<&NormalizedScore> = Vec::new();
    for name in &snapshot.my_roster {
        match by_name.get(&normalize_name(name)) {
            Some(score) => roster.push(score),
            None => warn!("roster player not in season stats: {}", name),
        }
    }

    let candidates: Vec<&NormalizedScore> = normalization
        .eligible()
        .filter(|s| !owned.contains(&normalize_name(&s.name)))
        .collect();
    info!(
        "{} unowned eligible candidates, {} of {} roster players matched",
        candidates.len(),
        roster.len(),
        snapshot.my_roster.len()
    );

    // ---- Roster analysis ----
    let team_needs = TeamNeeds::compute(&roster, &config.categories);
    let weakest = team_needs.weakest(config.needs.weakest_count);
    let roster_strength = RosterStrength::from_needs(&team_needs);
    debug!("weakest categories: {:?}", weakest);

    // ---- Shared signal sources ----
    let windows = upcoming_weeks(
        as_of,
        config.schedule.weeks_ahead,
        snapshot.settings.current_week,
        &snapshot.game_weeks,
    );
    let schedule = ScheduleAnalysis::build(&snapshot.schedule, windows, &config.schedule);
    if schedule.is_empty() {
        info!("no scheduled games in range; schedule multipliers neutral");
    }
    let injuries = InjuryLookup::build(&snapshot.injuries);
    let fallback_team_games = default_team_games(&snapshot.players);

    // ---- Per-candidate composition ----
    let mut excluded = Vec::new();
    let mut recs = Vec::with_capacity(candidates.len());
    for score in &candidates {
        let Some(player) = index.players.get(score.player_id.as_str()) else {
            continue;
        };
        let name_key = normalize_name(&score.name);
        let lines = index.recent_lines(&score.player_id);

        let availability = assess(player, lines, fallback_team_games, as_of, &config.availability);
        let injury = injuries.assess(&score.name, schedule.remaining_games(&score.team));
        let blurb = injuries
            .find(&score.name)
            .map(|r| r.blurb.as_str())
            .filter(|b| !b.trim().is_empty());
        let news = player_news_signal(blurb, index.articles(&name_key), lines, as_of);
        let (hot, trending) = if config.hot_pickup.enabled {
            (
                hot_pickup(&normalization.model, score, lines, &config.hot_pickup),
                index
                    .trends
                    .get(&name_key)
                    .and_then(|t| trending_signal(t, &config.hot_pickup)),
            )
        } else {
            (None, None)
        };

        let signals = CandidateSignals {
            score,
            need_score: need_score(score, &weakest, &config.needs),
            availability,
            injury,
            schedule_mult: schedule.multiplier(&score.team, &config.schedule),
            games_this_week: schedule.games_this_week(&score.team),
            news,
            hot,
            trending,
        };
        match compose(signals) {
            Some(rec) => recs.push(rec),
            None => {
                debug!("excluded {}: eliminated by injury", score.name);
                excluded.push(score.name.clone());
            }
        }
    }
    let recommendations = rank_recommendations(recs);
    info!(
        "ranked {} candidates ({} excluded)",
        recommendations.len(),
        excluded.len()
    );

    // ---- Bidding ----
    let pool_scores: Vec<f64> = recommendations.iter().map(|r| r.adj_score).collect();
    let tiers = TierTable::from_pool(&pool_scores, &config.bidding);
    let rec_scores: BTreeMap<String, f64> = recommendations
        .iter()
        .map(|r| (normalize_name(&r.name), r.adj_score))
        .collect();
    let bid_history = BidHistoryAnalysis::analyze(
        &snapshot.bids,
        &|name: &str| rec_scores.get(&normalize_name(name)).copied(),
        tiers,
        &config.bidding,
    );

    let budget = match (config.faab.enabled, snapshot.my_remaining_budget) {
        (true, Some(remaining)) => Some(compute_budget_status(
            remaining,
            &snapshot.settings,
            as_of,
            &snapshot.my_team,
            &snapshot.league_budgets,
            &config.faab,
        )),
        _ => None,
    };

    let used = snapshot.my_transactions_this_week.unwrap_or_else(|| {
        let week_start = fantasy_week_start(as_of, &snapshot.game_weeks);
        count_transactions_since(&snapshot.bids, &snapshot.my_team, week_start)
    });
    let transaction_limit = TransactionLimit::check(used, config.faab.weekly_transaction_limit);
    if transaction_limit.at_limit {
        warn!("{}", transaction_limit.message);
    }

    let bid_suggestions = if config.faab.enabled {
        suggest_batch(
            &recommendations,
            &bid_history,
            config,
            budget.as_ref(),
            &schedule,
            Some(&roster_strength),
        )
    } else {
        Vec::new()
    };

    // ---- Drops ----
    let droppables = droppable_candidates(&roster, &config.roster);
    let roster_impacts = match recommendations.first() {
        Some(top) => {
            let add = candidates.iter().find(|s| s.player_id == top.player_id);
            droppables
                .iter()
                .filter_map(|d| {
                    let drop = by_name.get(&normalize_name(&d.name))?;
                    Some(RosterImpact::compute(add?, drop, &config.categories))
                })
                .collect()
        }
        None => Vec::new(),
    };

    Ok(AnalysisReport {
        as_of,
        league_name: config.league_name.clone(),
        pool_size: normalization.eligible().count(),
        candidates_considered: candidates.len(),
        excluded,
        recommendations,
        team_needs,
        weakest_categories: weakest,
        roster_strength,
        droppables,
        roster_impacts,
        schedule,
        bid_history,
        budget,
        transaction_limit,
        bid_suggestions,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hoopcast_core::config::CategoryDefinition;
    use hoopcast_core::records::{InjuryReport, InjuryStatus, LeagueSettings};

    fn make_player(name: &str, pts: f64, reb: f64) -> PlayerSeasonRecord {
        PlayerSeasonRecord {
            player_id: name.to_lowercase().replace(' ', "_"),
            name: name.into(),
            team: "BOS".into(),
            games_played: 30,
            team_games_played: Some(30),
            minutes: 28.0,
            status: None,
            stats: [("PTS".to_string(), pts), ("REB".to_string(), reb)].into_iter().collect(),
        }
    }

    fn make_config() -> EngineConfig {
        EngineConfig {
            categories: vec![
                CategoryDefinition::counting("PTS", "PTS", true),
                CategoryDefinition::counting("REB", "REB", true),
            ],
            ..EngineConfig::default()
        }
    }

    fn make_snapshot() -> LeagueSnapshot {
        LeagueSnapshot {
            as_of: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            players: vec![
                make_player("Mine One", 25.0, 4.0),
                make_player("Mine Two", 22.0, 3.0),
                make_player("Free Scorer", 20.0, 3.0),
                make_player("Free Rebounder", 8.0, 12.0),
                make_player("Hurt Guy", 30.0, 10.0),
                make_player("Owned Elsewhere", 28.0, 8.0),
            ],
            recent_games: Vec::new(),
            injuries: vec![InjuryReport {
                player_name: "Hurt Guy".into(),
                team: "BOS".into(),
                status: InjuryStatus::OutForSeason,
                blurb: String::new(),
                suspension_games: None,
                return_imminent: false,
                extended_absence: false,
            }],
            news: Vec::new(),
            trends: Vec::new(),
            schedule: Vec::new(),
            game_weeks: Vec::new(),
            bids: Vec::new(),
            settings: LeagueSettings::default(),
            my_roster: vec!["Mine One".into(), "Mine Two".into()],
            owned_players: vec!["Owned Elsewhere".into()],
            my_team: "Me".into(),
            my_remaining_budget: Some(100),
            league_budgets: Vec::new(),
            my_transactions_this_week: Some(1),
        }
    }

    #[test]
    fn ranks_only_unowned_and_drops_eliminated() {
        let report = run_analysis(&make_snapshot(), &make_config()).unwrap();
        let names: Vec<&str> = report.recommendations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Free Scorer") && names.contains(&"Free Rebounder"));
        assert_eq!(report.excluded, vec!["Hurt Guy"]);
        assert_eq!(report.candidates_considered, 3);
        assert!(report.recommendations.iter().all(|r| r.injury_mult != 0.0));
    }

    #[test]
    fn weak_rebounding_roster_prefers_the_rebounder() {
        let report = run_analysis(&make_snapshot(), &make_config()).unwrap();
        assert_eq!(report.weakest_categories[0], "REB");
        assert_eq!(report.recommendations[0].name, "Free Rebounder");
        assert_eq!(report.recommendations[0].rank, 1);
    }

    #[test]
    fn bidding_outputs_present_when_faab_enabled() {
        let report = run_analysis(&make_snapshot(), &make_config()).unwrap();
        assert_eq!(report.bid_suggestions.len(), 2);
        assert_eq!(report.budget.as_ref().unwrap().max_single_bid, 50);
        assert_eq!(report.transaction_limit.used, 1);
        assert_eq!(report.droppables.len(), 2);
        assert_eq!(report.roster_impacts.len(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            categories: Vec::new(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            run_analysis(&make_snapshot(), &config),
            Err(EngineError::Config(_))
        ));
    }
}
