// Hot-pickup and ownership-trend boosts.
//
// A player's last few box scores are averaged and scored against the
// season model, so `z_delta` measures how far the recent form sits above
// the season line on the same scale.

use std::collections::BTreeMap;

use hoopcast_core::config::{CategoryDefinition, HotPickupConfig};
use hoopcast_core::records::{OwnershipTrend, RecentGameLine};
use serde::Serialize;

use super::round_to;
use super::zscore::{NormalizedScore, NormalizerModel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotPickupScore {
    pub recent_z: f64,
    pub season_z: f64,
    pub z_delta: f64,
    pub is_hot: bool,
    pub games_used: usize,
    /// `recency_weight * z_delta` when the delta is positive, else 0.
    pub boost: f64,
}

/// Per-game averages over the last `n` played games.
///
/// Every stat key seen in the window is averaged with missing values
/// counted as 0. Percentage categories with a made key are recomputed from
/// made and attempted totals. Returns the averages and the number of games
/// used, `None` when no game in `lines` was played.
pub fn recent_averages(
    lines: &[&RecentGameLine],
    n: usize,
    categories: &[CategoryDefinition],
) -> Option<(BTreeMap<String, f64>, usize)> {
    let mut played: Vec<&RecentGameLine> =
        lines.iter().copied().filter(|l| l.is_game_played()).collect();
    if played.is_empty() || n == 0 {
        return None;
    }
    played.sort_by(|a, b| b.game_date.cmp(&a.game_date));
    played.truncate(n);
    let count = played.len();

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for line in &played {
        for (key, value) in &line.stats {
            if value.is_finite() {
                *totals.entry(key.clone()).or_insert(0.0) += value;
            }
        }
    }

    let mut averages: BTreeMap<String, f64> = totals
        .iter()
        .map(|(key, total)| (key.clone(), total / count as f64))
        .collect();

    for cat in categories {
        let (Some(made_key), Some(volume_key)) = (&cat.made_key, &cat.volume_key) else {
            continue;
        };
        let made = totals.get(made_key).copied().unwrap_or(0.0);
        let volume = totals.get(volume_key).copied().unwrap_or(0.0);
        if volume > 0.0 {
            averages.insert(cat.key.clone(), made / volume);
        }
    }

    Some((averages, count))
}

/// Score recent form against the season model.
pub fn hot_pickup(
    model: &NormalizerModel,
    season: &NormalizedScore,
    lines: &[&RecentGameLine],
    cfg: &HotPickupConfig,
) -> Option<HotPickupScore> {
    let definitions: Vec<CategoryDefinition> =
        model.categories.iter().map(|c| c.definition.clone()).collect();
    let (averages, games_used) = recent_averages(lines, cfg.recent_games, &definitions)?;

    let recent = model.score_values(&|key| averages.get(key).copied());
    let recent_z = model.total(&recent);
    let z_delta = round_to(recent_z - season.total, 2);
    let boost = if z_delta > 0.0 {
        cfg.recency_weight * z_delta
    } else {
        0.0
    };

    Some(HotPickupScore {
        recent_z: round_to(recent_z, 2),
        season_z: round_to(season.total, 2),
        z_delta,
        is_hot: z_delta >= cfg.hot_threshold,
        games_used,
        boost,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingSignal {
    pub percent_owned: f64,
    pub delta: f64,
    pub boost: f64,
}

/// Ownership-trend boost, `None` below the configured delta.
pub fn trending_signal(trend: &OwnershipTrend, cfg: &HotPickupConfig) -> Option<TrendingSignal> {
    if trend.percent_owned_delta < cfg.min_delta {
        return None;
    }
    Some(TrendingSignal {
        percent_owned: trend.percent_owned,
        delta: trend.percent_owned_delta,
        boost: cfg.trending_weight * (trend.percent_owned_delta / 10.0).min(3.0),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
