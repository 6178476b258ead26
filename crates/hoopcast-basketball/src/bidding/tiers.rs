// Quality tiers: static thresholds or percentile cuts over the current
// candidate pool, clamped to per-tier floors.

use std::cmp::Ordering;

use hoopcast_core::config::{BiddingConfig, TierSpec};
use serde::Serialize;
use tracing::debug;

use crate::valuation::round_to;

/// Tier for bids whose player could not be scored.
pub const UNKNOWN_TIER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierThreshold {
    pub name: String,
    /// `None` marks the catch-all tier.
    pub min: Option<f64>,
}

/// Ordered top-down; the first satisfied minimum wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierTable {
    pub tiers: Vec<TierThreshold>,
    pub percentile_based: bool,
}

impl TierTable {
    pub fn from_specs(specs: &[TierSpec]) -> Self {
        TierTable {
            tiers: specs
                .iter()
                .map(|s| TierThreshold {
                    name: s.name.clone(),
                    min: s.min,
                })
                .collect(),
            percentile_based: false,
        }
    }

    /// Percentile cuts over `pool_scores` once the pool is large enough,
    /// the static table otherwise.
    pub fn from_pool(pool_scores: &[f64], cfg: &BiddingConfig) -> Self {
        let mut sorted: Vec<f64> = pool_scores.iter().copied().filter(|s| s.is_finite()).collect();
        if sorted.len() < cfg.min_pool_for_percentiles || cfg.percentile_tiers.is_empty() {
            debug!(
                "static tiers ({} pool scores, need {})",
                sorted.len(),
                cfg.min_pool_for_percentiles
            );
            return Self::from_specs(&cfg.default_tiers);
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut tiers: Vec<TierThreshold> = cfg
            .percentile_tiers
            .iter()
            .map(|spec| {
                let cut = round_to(percentile_linear(&sorted, spec.percentile), 2);
                TierThreshold {
                    name: spec.name.clone(),
                    min: Some(cut.max(spec.floor)),
                }
            })
            .collect();
        tiers.push(TierThreshold {
            name: catch_all_name(&cfg.default_tiers).to_string(),
            min: None,
        });
        debug!("percentile tiers: {:?}", tiers);

        TierTable {
            tiers,
            percentile_based: true,
        }
    }

    /// Tier name for a score; below every minimum lands in the catch-all.
    pub fn assign(&self, score: f64) -> &str {
        self.tiers
            .iter()
            .find(|t| t.min.map_or(true, |min| score >= min))
            .map(|t| t.name.as_str())
            .unwrap_or_else(|| self.catch_all())
    }

    pub fn top_tier(&self) -> Option<&str> {
        self.tiers.first().map(|t| t.name.as_str())
    }

    pub fn catch_all(&self) -> &str {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.min.is_none())
            .or(self.tiers.last())
            .map(|t| t.name.as_str())
            .unwrap_or("Dart")
    }
}

fn catch_all_name(specs: &[TierSpec]) -> &str {
    specs
        .iter()
        .find(|s| s.min.is_none())
        .map(|s| s.name.as_str())
        .unwrap_or("Dart")
}

/// Percentile with linear interpolation between closest ranks. `sorted`
/// must be ascending and non-empty; `pct` is in `[0, 100]`.
pub fn percentile_linear(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
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

    #[test]
    fn static_table_assignment() {
        let table = TierTable::from_specs(&BiddingConfig::default().default_tiers);
        assert_eq!(table.assign(7.0), "Elite");
        assert_eq!(table.assign(6.0), "Elite");
        assert_eq!(table.assign(4.5), "Strong");
        assert_eq!(table.assign(2.5), "Solid");
        assert_eq!(table.assign(1.0), "Streamer");
        assert_eq!(table.assign(0.2), "Dart");
        assert_eq!(table.assign(-5.0), "Dart");
        assert_eq!(table.top_tier(), Some("Elite"));
    }

    #[test]
    fn linear_percentile_matches_closest_rank_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!(approx_eq(percentile_linear(&sorted, 50.0), 2.5, 1e-12));
        assert!(approx_eq(percentile_linear(&sorted, 90.0), 3.7, 1e-12));
        assert!(approx_eq(percentile_linear(&sorted, 0.0), 1.0, 1e-12));
        assert!(approx_eq(percentile_linear(&sorted, 100.0), 4.0, 1e-12));
    }

    #[test]
    fn small_pool_keeps_static_tiers() {
        let cfg = BiddingConfig::default();
        let table = TierTable::from_pool(&[1.0, 2.0, 3.0], &cfg);
        assert!(!table.percentile_based);
        assert_eq!(table.tiers.len(), 5);
    }

    #[test]
    fn percentile_cuts_are_floored() {
        let cfg = BiddingConfig::default();
        // A weak pool: every percentile falls under its floor.
        let weak: Vec<f64> = (0..20).map(|i| i as f64 * 0.01).collect();
        let table = TierTable::from_pool(&weak, &cfg);
        assert!(table.percentile_based);
        let mins: Vec<Option<f64>> = table.tiers.iter().map(|t| t.min).collect();
        assert_eq!(mins, vec![Some(4.0), Some(2.5), Some(1.5), Some(0.5), None]);
        assert_eq!(table.assign(0.19), "Dart");
    }

    #[test]
    fn percentile_cuts_track_a_deep_pool() {
        let cfg = BiddingConfig::default();
        // 0..=10 in steps of 1: p90 = 9, p70 = 7, p40 = 4, p15 = 1.5.
        let deep: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let table = TierTable::from_pool(&deep, &cfg);
        let mins: Vec<Option<f64>> = table.tiers.iter().map(|t| t.min).collect();
        assert_eq!(mins, vec![Some(9.0), Some(7.0), Some(4.0), Some(1.5), None]);
        assert_eq!(table.assign(8.0), "Strong");
    }

    #[test]
    fn higher_score_never_lowers_tier() {
        let table = TierTable::from_specs(&BiddingConfig::default().default_tiers);
        let rank = |name: &str| table.tiers.iter().position(|t| t.name == name).unwrap();
        let mut prev = rank(table.assign(-3.0));
        for i in -30..100 {
            let idx = rank(table.assign(i as f64 * 0.1));
            assert!(idx <= prev);
            prev = idx;
        }
    }
}
