// Category z-scores with volume-weighted shooting percentages.

use std::collections::BTreeMap;

use hoopcast_core::config::{CategoryDefinition, EligibilityConfig, EngineConfig};
use hoopcast_core::records::PlayerSeasonRecord;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("no categories configured")]
    NoCategories,

    #[error("no eligible players to build the z-score pool from")]
    EmptyPool,

    #[error("category `{key}` has no computable values in the player pool")]
    EmptyCategory { key: String },
}

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation for one category across the player pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Compute mean and sample standard deviation (n − 1 denominator).
///
/// Fewer than two values yields a zero standard deviation, so every z-score
/// against these stats is 0.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return PoolStats { mean, stdev: 0.0 };
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Compute a z-score given a value and pool stats.
///
/// Returns 0.0 if the standard deviation is approximately zero.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

/// Shooting-percentage impact: `volume × (pct − league_avg_pct)`.
///
/// A 60% shooter on 2 attempts moves a team's FG% less than a 50% shooter
/// on 18 attempts; scoring the impact instead of the raw percentage
/// reproduces that.
pub fn volume_impact(volume: f64, pct: f64, league_avg_pct: f64) -> f64 {
    volume * (pct - league_avg_pct)
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Fitted statistics for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryModel {
    pub definition: CategoryDefinition,
    /// Raw-value stats for counting categories, impact stats for
    /// volume-weighted ones.
    pub stats: PoolStats,
    /// Pool mean of the percentage, set for volume-weighted categories.
    pub league_avg_pct: Option<f64>,
    pub sample_size: usize,
}

impl CategoryModel {
    /// Transform the raw inputs for this category into the value that gets
    /// z-scored. `None` when a required input is missing.
    fn input(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> Option<f64> {
        let value = lookup(&self.definition.key)?;
        match (&self.definition.volume_key, self.league_avg_pct) {
            (Some(volume_key), Some(avg)) => {
                let volume = lookup(volume_key)?;
                Some(volume_impact(volume, value, avg))
            }
            _ => Some(value),
        }
    }

    fn zscore(&self, input: f64) -> f64 {
        let z = compute_zscore(input, &self.stats);
        if self.definition.higher_is_better {
            z
        } else {
            -z
        }
    }
}

/// Per-category fitted statistics. The same model scores season lines,
/// recent-game averages and roster players so every z-score in a run is
/// on one scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizerModel {
    pub categories: Vec<CategoryModel>,
}

impl NormalizerModel {
    /// Fit category statistics over `pool`.
    ///
    /// Players missing a category's value (or its volume) are left out of
    /// that category only. A non-punted category with no values at all is
    /// an error.
    pub fn fit(
        pool: &[&PlayerSeasonRecord],
        categories: &[CategoryDefinition],
    ) -> Result<Self, NormalizeError> {
        if categories.is_empty() {
            return Err(NormalizeError::NoCategories);
        }
        if pool.is_empty() {
            return Err(NormalizeError::EmptyPool);
        }

        let mut fitted = Vec::with_capacity(categories.len());
        for def in categories {
            let model = match &def.volume_key {
                Some(volume_key) => {
                    let pairs: Vec<(f64, f64)> = pool
                        .iter()
                        .filter_map(|p| Some((p.stat(&def.key)?, p.stat(volume_key)?)))
                        .collect();
                    let pcts: Vec<f64> = pairs.iter().map(|(pct, _)| *pct).collect();
                    let avg = compute_pool_stats(&pcts).mean;
                    let impacts: Vec<f64> = pairs
                        .iter()
                        .map(|(pct, vol)| volume_impact(*vol, *pct, avg))
                        .collect();
                    CategoryModel {
                        definition: def.clone(),
                        stats: compute_pool_stats(&impacts),
                        league_avg_pct: Some(avg),
                        sample_size: pairs.len(),
                    }
                }
                None => {
                    let values: Vec<f64> = pool.iter().filter_map(|p| p.stat(&def.key)).collect();
                    CategoryModel {
                        definition: def.clone(),
                        stats: compute_pool_stats(&values),
                        league_avg_pct: None,
                        sample_size: values.len(),
                    }
                }
            };

            if model.sample_size == 0 && !def.punted {
                return Err(NormalizeError::EmptyCategory {
                    key: def.key.clone(),
                });
            }
            debug!(
                "{}: n={} mean={:.3} stdev={:.3}",
                def.key, model.sample_size, model.stats.mean, model.stats.stdev
            );
            fitted.push(model);
        }

        Ok(NormalizerModel { categories: fitted })
    }

    pub fn category(&self, key: &str) -> Option<&CategoryModel> {
        self.categories.iter().find(|c| c.definition.key == key)
    }

    /// Z-score every category (punted ones included) for which `lookup`
    /// supplies the needed inputs.
    pub fn score_values(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> BTreeMap<String, f64> {
        self.categories
            .iter()
            .filter_map(|cat| {
                let input = cat.input(lookup)?;
                Some((cat.definition.key.clone(), cat.zscore(input)))
            })
            .collect()
    }

    /// Sum of the non-punted z-scores.
    pub fn total(&self, zscores: &BTreeMap<String, f64>) -> f64 {
        self.categories
            .iter()
            .filter(|c| !c.definition.punted)
            .filter_map(|c| zscores.get(&c.definition.key))
            .sum()
    }

    pub fn score_player(&self, player: &PlayerSeasonRecord, eligible: bool) -> NormalizedScore {
        let zscores = self.score_values(&|key| player.stat(key));
        let total = self.total(&zscores);
        NormalizedScore {
            player_id: player.player_id.clone(),
            name: player.name.clone(),
            team: player.team.clone(),
            zscores,
            total,
            eligible,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Per-player z-scores and their non-punted total (`Z_TOTAL`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedScore {
    pub player_id: String,
    pub name: String,
    pub team: String,
    pub zscores: BTreeMap<String, f64>,
    pub total: f64,
    /// Passed the eligibility filter and was part of the fitting pool.
    pub eligible: bool,
}

impl NormalizedScore {
    /// Category z-score, 0 when the player had no value for it.
    pub fn z(&self, key: &str) -> f64 {
        self.zscores.get(key).copied().unwrap_or(0.0)
    }
}

/// Fitted model plus a score for every input player, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalization {
    pub model: NormalizerModel,
    pub scores: Vec<NormalizedScore>,
}

impl Normalization {
    pub fn eligible(&self) -> impl Iterator<Item = &NormalizedScore> {
        self.scores.iter().filter(|s| s.eligible)
    }
}

// ---------------------------------------------------------------------------
// Top-level entry point
// ---------------------------------------------------------------------------

pub fn is_eligible(player: &PlayerSeasonRecord, cfg: &EligibilityConfig) -> bool {
    player.games_played >= cfg.min_games && player.minutes >= cfg.min_minutes
}

/// Compute z-scores for every player.
///
/// Steps:
/// 1. Filter the fitting pool by minimum games played and minutes.
/// 2. Fit per-category stats over the pool (impact stats for
///    volume-weighted categories).
/// 3. Score every player, including those below the eligibility
///    thresholds, against the pool stats.
pub fn normalize(
    players: &[PlayerSeasonRecord],
    config: &EngineConfig,
) -> Result<Normalization, NormalizeError> {
    let pool: Vec<&PlayerSeasonRecord> = players
        .iter()
        .filter(|p| is_eligible(p, &config.eligibility))
        .collect();
    info!(
        "z-score pool: {} of {} players eligible",
        pool.len(),
        players.len()
    );

    let model = NormalizerModel::fit(&pool, &config.categories)?;
    let scores = players
        .iter()
        .map(|p| model.score_player(p, is_eligible(p, &config.eligibility)))
        .collect();

    Ok(Normalization { model, scores })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
