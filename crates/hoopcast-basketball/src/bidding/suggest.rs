// Bid suggester: prices a candidate from its tier's standard-bid history,
// then scales for budget health, schedule density and roster strength.

use hoopcast_core::config::{BidStrategy, EngineConfig};
use serde::Serialize;
use tracing::debug;

use super::budget::BudgetStatus;
use super::history::BidHistoryAnalysis;
use crate::valuation::adjust::AdjustedRecommendation;
use crate::valuation::needs::RosterStrength;
use crate::valuation::round_to;
use crate::valuation::schedule::{normalize_team_abbr, ScheduleAnalysis};

/// Standard bids a tier needs before its distribution is trusted.
const MIN_TIER_BIDS: usize = 2;
const HIGH_CONFIDENCE_BIDS: usize = 5;
const TOP_TIER_BUMP: f64 = 0.1;
const FALLBACK_SCORE_SCALE: f64 = 5.0;
const FALLBACK_MAX_MULTIPLIER: f64 = 2.0;
const VALUE_MULTIPLIER: f64 = 0.7;
const AGGRESSIVE_MULTIPLIER: f64 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// What premium (outlier) bids have gone for, shown next to every
/// suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumRange {
    pub min: u32,
    pub max: u32,
    pub median: f64,
    pub count: usize,
}

/// Optional scaling context for one suggestion.
#[derive(Debug, Clone, Copy)]
pub struct BidContext<'a> {
    pub budget: Option<&'a BudgetStatus>,
    pub schedule_games: Option<u32>,
    pub avg_games: f64,
    pub roster: Option<&'a RosterStrength>,
    /// Bid change per game above or below the weekly average.
    pub game_factor: f64,
}

impl Default for BidContext<'_> {
    fn default() -> Self {
        BidContext {
            budget: None,
            schedule_games: None,
            avg_games: 3.5,
            roster: None,
            game_factor: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidSuggestion {
    pub player: String,
    pub team: String,
    pub adj_score: f64,
    pub tier: String,
    pub strategy: BidStrategy,
    /// Strategy pick before any scaling.
    pub base_bid: u32,
    pub suggested_bid: u32,
    pub confidence: Confidence,
    pub reason: String,
    pub games_this_week: Option<u32>,
    pub premium_range: Option<PremiumRange>,
}

/// Scale a raw bid. Steps, each truncating toward zero:
/// 1. Budget factor, then cap at the max single bid and the remaining budget.
/// 2. Schedule: `1 + game_factor × (games − avg)`.
/// 3. Roster-strength factor.
///
/// The scaled bid is capped again at both budget limits and is never
/// below 1.
pub fn apply_adjustments(bid: u32, ctx: &BidContext<'_>) -> u32 {
    let mut bid = bid as i64;

    if let Some(budget) = ctx.budget {
        bid = (bid as f64 * budget.budget_factor) as i64;
        bid = bid
            .min(budget.max_single_bid as i64)
            .min(budget.remaining_budget as i64);
    }

    if let Some(games) = ctx.schedule_games {
        let factor = 1.0 + ctx.game_factor * (games as f64 - ctx.avg_games);
        bid = (bid as f64 * factor) as i64;
    }

    if let Some(roster) = ctx.roster {
        bid = (bid as f64 * roster.bid_factor) as i64;
    }

    if let Some(budget) = ctx.budget {
        bid = bid
            .min(budget.max_single_bid as i64)
            .min(budget.remaining_budget as i64);
    }

    bid.max(1) as u32
}

fn premium_range(analysis: &BidHistoryAnalysis) -> Option<PremiumRange> {
    analysis.premium.as_ref().map(|p| PremiumRange {
        min: p.min,
        max: p.max,
        median: p.median,
        count: p.count,
    })
}

/// Suggest a bid for one candidate.
///
/// With at least two standard bids in the candidate's tier the strategy
/// picks a point of that distribution (the top tier gets a 10% bump, at
/// least $1). Otherwise the league median is scaled by `score / 5`.
pub fn suggest_bid(
    player: &str,
    team: &str,
    adj_score: f64,
    analysis: &BidHistoryAnalysis,
    strategy: BidStrategy,
    default_bid: u32,
    ctx: &BidContext<'_>,
) -> BidSuggestion {
    let tier = analysis.tiers.assign(adj_score).to_string();
    let tier_stats = analysis.tier_stats(&tier).filter(|s| s.count >= MIN_TIER_BIDS);

    let (base_bid, confidence, mut reason) = match tier_stats {
        Some(stats) => {
            let (pick, reason) = match strategy {
                BidStrategy::Value => (
                    stats.p25.unwrap_or(stats.min) as f64,
                    format!("P25 for {tier} tier (bargain, std bids)"),
                ),
                BidStrategy::Aggressive => (
                    stats.p75.unwrap_or(stats.max) as f64,
                    format!("P75 for {tier} tier (higher win rate, std bids)"),
                ),
                BidStrategy::Competitive => (
                    stats.median,
                    format!("Median for {tier} tier (market rate, std bids)"),
                ),
            };
            let pick = if analysis.tiers.top_tier() == Some(tier.as_str()) {
                pick + ((pick * TOP_TIER_BUMP).round_ties_even() as i64).max(1) as f64
            } else {
                pick
            };
            let confidence = if stats.count >= HIGH_CONFIDENCE_BIDS {
                Confidence::High
            } else {
                Confidence::Medium
            };
            (pick.max(0.0) as u32, confidence, reason)
        }
        None => {
            let count = analysis.tier_stats(&tier).map_or(0, |s| s.count);
            let league_median = analysis.league_median().unwrap_or(default_bid as f64);
            let score_mult = (adj_score / FALLBACK_SCORE_SCALE).min(FALLBACK_MAX_MULTIPLIER);
            let base = ((league_median * score_mult) as i64).max(1);
            let pick = match strategy {
                BidStrategy::Value => ((base as f64 * VALUE_MULTIPLIER) as i64).max(1),
                BidStrategy::Aggressive => (base as f64 * AGGRESSIVE_MULTIPLIER) as i64,
                BidStrategy::Competitive => base,
            };
            let reason = format!(
                "Limited tier data ({count} std bids). Estimate based on league median (${league_median}) × score factor."
            );
            (pick.max(0) as u32, Confidence::Low, reason)
        }
    };

    let suggested_bid = apply_adjustments(base_bid, ctx);

    match confidence {
        Confidence::Low => {
            if let Some(budget) = ctx.budget {
                reason.push_str(&format!(" Budget: {}.", budget.status.label()));
            }
            if let Some(roster) = ctx.roster {
                reason.push_str(&format!(" Roster: {}.", roster.label));
            }
            if let Some(games) = ctx.schedule_games {
                reason.push_str(&format!(" Games/wk: {games}."));
            }
        }
        _ => {
            let mut extras: Vec<String> = Vec::new();
            if let Some(budget) = ctx.budget {
                let rank = budget
                    .standing
                    .as_ref()
                    .map(|s| format!(" #{}/{}", s.rank, s.size))
                    .unwrap_or_default();
                extras.push(format!("Budget: {}{}", budget.status.label(), rank));
            }
            if let Some(roster) = ctx.roster {
                extras.push(format!("Roster: {}", roster.label));
            }
            if let Some(games) = ctx.schedule_games {
                extras.push(format!("{games}G this week"));
            }
            if !extras.is_empty() {
                reason.push_str(&format!(" ({})", extras.join(", ")));
            }
        }
    }

    debug!("{player}: {tier} tier, base ${base_bid} -> ${suggested_bid} ({})", confidence.label());

    BidSuggestion {
        player: player.to_string(),
        team: team.to_string(),
        adj_score: round_to(adj_score, 2),
        tier,
        strategy,
        base_bid,
        suggested_bid,
        confidence,
        reason,
        games_this_week: ctx.schedule_games,
        premium_range: premium_range(analysis),
    }
}

/// Suggestions for the top `bidding.top_n` recommendations, each priced
/// with its team's game count for the current week.
pub fn suggest_batch(
    recs: &[AdjustedRecommendation],
    analysis: &BidHistoryAnalysis,
    config: &EngineConfig,
    budget: Option<&BudgetStatus>,
    schedule: &ScheduleAnalysis,
    roster: Option<&RosterStrength>,
) -> Vec<BidSuggestion> {
    let avg_games = schedule.avg_games_this_week();
    recs.iter()
        .take(config.bidding.top_n)
        .map(|rec| {
            let schedule_games = schedule
                .weeks
                .first()
                .and_then(|w| w.game_counts.get(&normalize_team_abbr(&rec.team)).copied());
            let ctx = BidContext {
                budget,
                schedule_games,
                avg_games,
                roster,
                game_factor: config.schedule.bid_game_factor,
            };
            suggest_bid(
                &rec.name,
                &rec.team,
                rec.adj_score,
                analysis,
                config.bidding.strategy,
                config.faab.default_bid,
                &ctx,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::budget::BudgetHealth;
    use crate::bidding::tiers::TierTable;
    use hoopcast_core::config::BiddingConfig;
    use hoopcast_core::records::HistoricalBidRecord;

    fn make_bid(name: &str, amount: u32) -> HistoricalBidRecord {
        HistoricalBidRecord {
            player_name: name.into(),
            amount,
            team: "T".into(),
            timestamp: None,
        }
    }

    /// Six Solid-tier bids (4, 4, 8, 8, 15, 15) and two Elite bids.
    fn make_analysis() -> BidHistoryAnalysis {
        let mut records: Vec<HistoricalBidRecord> = [4, 4, 8, 8, 15, 15]
            .into_iter()
            .map(|a| make_bid("Solid Guy", a))
            .collect();
        records.push(make_bid("Elite Guy", 12));
        records.push(make_bid("Elite Guy", 14));
        let score_for = |name: &str| match name {
            "Solid Guy" => Some(3.0),
            "Elite Guy" => Some(7.0),
            _ => None,
        };
        let cfg = BiddingConfig {
            premium_floor: 100.0,
            ..BiddingConfig::default()
        };
        let tiers = TierTable::from_specs(&cfg.default_tiers);
        BidHistoryAnalysis::analyze(&records, &score_for, tiers, &cfg)
    }

    fn make_budget(remaining: u32, factor: f64) -> BudgetStatus {
        BudgetStatus {
            remaining_budget: remaining,
            total_budget: 300,
            weeks_remaining: 10,
            weekly_budget: remaining as f64 / 10.0,
            pace_factor: factor,
            standing: None,
            budget_factor: factor,
            status: BudgetHealth::from_factor(factor),
            is_playoffs: false,
            max_single_bid: remaining / 2,
        }
    }

    #[test]
    fn strategy_picks_from_tier_distribution() {
        let analysis = make_analysis();
        let solid = analysis.tier_stats("Solid").unwrap();
        assert_eq!((solid.p25, solid.median, solid.p75), (Some(4), 8.0, Some(15)));

        let ctx = BidContext::default();
        let pick = |strategy| suggest_bid("X", "BOS", 3.0, &analysis, strategy, 1, &ctx);
        let aggressive = pick(BidStrategy::Aggressive);
        assert_eq!(aggressive.suggested_bid, 15);
        assert_eq!(aggressive.confidence, Confidence::High);
        assert_eq!(aggressive.reason, "P75 for Solid tier (higher win rate, std bids)");
        assert_eq!(pick(BidStrategy::Value).suggested_bid, 4);
        assert_eq!(pick(BidStrategy::Competitive).suggested_bid, 8);
    }

    #[test]
    fn top_tier_gets_a_bump() {
        let analysis = make_analysis();
        let s = suggest_bid("X", "BOS", 9.0, &analysis, BidStrategy::Competitive, 1, &BidContext::default());
        // Median 13, +1.
        assert_eq!(s.tier, "Elite");
        assert_eq!(s.suggested_bid, 14);
        assert_eq!(s.confidence, Confidence::Medium);
    }

    #[test]
    fn fallback_scales_league_median() {
        let analysis = make_analysis();
        // Streamer tier has no bids. League median of standard bids: 10.
        let s = suggest_bid("X", "BOS", 2.0, &analysis, BidStrategy::Competitive, 1, &BidContext::default());
        assert_eq!(s.confidence, Confidence::Low);
        assert_eq!(s.suggested_bid, 4);
        assert!(s.reason.starts_with("Limited tier data (0 std bids)"));

        let value = suggest_bid("X", "BOS", 2.0, &analysis, BidStrategy::Value, 1, &BidContext::default());
        assert_eq!(value.suggested_bid, 2);
        let aggressive = suggest_bid("X", "BOS", 2.0, &analysis, BidStrategy::Aggressive, 1, &BidContext::default());
        assert_eq!(aggressive.suggested_bid, 5);
    }

    #[test]
    fn fallback_without_history_uses_default_bid() {
        let cfg = BiddingConfig::default();
        let analysis =
            BidHistoryAnalysis::analyze(&[], &|_| None, TierTable::from_specs(&cfg.default_tiers), &cfg);
        let s = suggest_bid("X", "BOS", -1.0, &analysis, BidStrategy::Aggressive, 1, &BidContext::default());
        assert_eq!(s.suggested_bid, 1);
    }

    #[test]
    fn budget_caps_apply() {
        let budget = make_budget(20, 2.0);
        let ctx = BidContext {
            budget: Some(&budget),
            ..BidContext::default()
        };
        assert_eq!(apply_adjustments(8, &ctx), 10);
        let broke = BudgetStatus {
            max_single_bid: 50,
            ..make_budget(3, 2.0)
        };
        let ctx = BidContext {
            budget: Some(&broke),
            ..BidContext::default()
        };
        assert_eq!(apply_adjustments(8, &ctx), 3);
    }

    #[test]
    fn schedule_and_roster_scale_in_order() {
        let roster = RosterStrength {
            avg_z: -1.0,
            strong_cats: Vec::new(),
            weak_cats: Vec::new(),
            label: "Weak roster",
            bid_factor: 1.15,
        };
        let ctx = BidContext {
            schedule_games: Some(5),
            avg_games: 3.5,
            roster: Some(&roster),
            ..BidContext::default()
        };
        // 10 * 1.225 = 12, then 12 * 1.15 = 13.
        assert_eq!(apply_adjustments(10, &ctx), 13);

        let sparse = BidContext {
            schedule_games: Some(0),
            avg_games: 3.5,
            ..BidContext::default()
        };
        assert_eq!(apply_adjustments(10, &sparse), 4);
        let empty = BidContext {
            schedule_games: Some(0),
            avg_games: 12.0,
            ..BidContext::default()
        };
        assert_eq!(apply_adjustments(10, &empty), 1);
    }

    #[test]
    fn reason_lists_context() {
        let analysis = make_analysis();
        let budget = make_budget(200, 1.5);
        let ctx = BidContext {
            budget: Some(&budget),
            schedule_games: Some(4),
            avg_games: 3.5,
            ..BidContext::default()
        };
        let s = suggest_bid("X", "BOS", 3.0, &analysis, BidStrategy::Competitive, 1, &ctx);
        assert_eq!(
            s.reason,
            "Median for Solid tier (market rate, std bids) (Budget: FLUSH, 4G this week)"
        );
        assert!(s.premium_range.is_none());
    }
}
