// Composite adjuster: folds the per-player signals into one ranked score.
//
//   AdjScore = NeedScore * avail * injury * schedule * news
//              + recency_boost + trending_boost

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::availability::{Availability, AvailabilityFlag, RecentActivity};
use super::hot::{HotPickupScore, TrendingSignal};
use super::injury::InjuryAssessment;
use super::news::NewsSignal;
use super::round_to;
use super::zscore::NormalizedScore;

/// At or below this injury multiplier a player cannot be lifted by
/// additive boosts.
pub const NEAR_ELIMINATION: f64 = 0.05;

const INJURY_NOTE_LEN: usize = 60;

/// Everything the adjuster needs to know about one candidate.
#[derive(Debug, Clone)]
pub struct CandidateSignals<'a> {
    pub score: &'a NormalizedScore,
    pub need_score: f64,
    pub availability: Availability,
    pub injury: Option<InjuryAssessment>,
    pub schedule_mult: f64,
    pub games_this_week: u32,
    pub news: Option<NewsSignal>,
    pub hot: Option<HotPickupScore>,
    pub trending: Option<TrendingSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedRecommendation {
    /// 1-based position after sorting; 0 until ranked.
    pub rank: usize,
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub zscores: BTreeMap<String, f64>,
    pub z_total: f64,
    pub need_score: f64,
    pub avail_mult: f64,
    pub availability_flag: AvailabilityFlag,
    pub recent_activity: RecentActivity,
    pub injury_mult: f64,
    pub injury_label: Option<&'static str>,
    pub injury_note: Option<String>,
    pub schedule_mult: f64,
    pub games_this_week: u32,
    pub news_mult: f64,
    pub news_labels: Vec<String>,
    pub recency_boost: f64,
    pub trending_boost: f64,
    pub z_delta: Option<f64>,
    pub is_hot: bool,
    pub is_trending: bool,
    pub adj_score: f64,
}

/// Combine one candidate's signals. `None` for a fully eliminated player
/// (injury multiplier exactly 0).
pub fn compose(signals: CandidateSignals<'_>) -> Option<AdjustedRecommendation> {
    let injury_mult = signals.injury.as_ref().map_or(1.0, |i| i.multiplier);
    if injury_mult == 0.0 {
        return None;
    }

    let news_mult = signals.news.as_ref().map_or(1.0, |n| n.multiplier);
    let (mut recency_boost, mut trending_boost) = (
        signals.hot.as_ref().map_or(0.0, |h| h.boost),
        signals.trending.as_ref().map_or(0.0, |t| t.boost),
    );
    if injury_mult <= NEAR_ELIMINATION {
        recency_boost = 0.0;
        trending_boost = 0.0;
    }

    let adj_score = signals.need_score
        * signals.availability.multiplier
        * injury_mult
        * signals.schedule_mult
        * news_mult
        + recency_boost
        + trending_boost;

    let score = signals.score;
    Some(AdjustedRecommendation {
        rank: 0,
        player_id: score.player_id.clone(),
        name: score.name.clone(),
        team: score.team.clone(),
        zscores: score.zscores.clone(),
        z_total: score.total,
        need_score: signals.need_score,
        avail_mult: signals.availability.multiplier,
        availability_flag: signals.availability.flag,
        recent_activity: signals.availability.recent,
        injury_mult,
        injury_label: signals.injury.as_ref().map(|i| i.label),
        injury_note: signals.injury.as_ref().map(|i| i.note(INJURY_NOTE_LEN)),
        schedule_mult: signals.schedule_mult,
        games_this_week: signals.games_this_week,
        news_mult,
        news_labels: signals.news.map(|n| n.labels).unwrap_or_default(),
        recency_boost,
        trending_boost,
        z_delta: signals.hot.as_ref().map(|h| h.z_delta),
        is_hot: signals.hot.as_ref().is_some_and(|h| h.is_hot),
        is_trending: signals.trending.is_some(),
        adj_score: round_to(adj_score, 2),
    })
}

/// Sort descending by `adj_score` (ties keep input order) and number the
/// ranks from 1.
pub fn rank_recommendations(mut recs: Vec<AdjustedRecommendation>) -> Vec<AdjustedRecommendation> {
    recs.sort_by(|a, b| b.adj_score.partial_cmp(&a.adj_score).unwrap_or(Ordering::Equal));
    for (i, rec) in recs.iter_mut().enumerate() {
        rec.rank = i + 1;
    }
    recs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
