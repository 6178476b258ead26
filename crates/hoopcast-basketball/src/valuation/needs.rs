// Roster analysis: category needs, overall strength, drop candidates and
// the category impact of an add/drop swap.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use hoopcast_core::config::{CategoryDefinition, NeedConfig, RosterConfig};
use hoopcast_core::names::normalize_name;
use serde::Serialize;

use super::round_to;
use super::zscore::NormalizedScore;

// ---------------------------------------------------------------------------
// Team needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNeed {
    pub key: String,
    pub name: String,
    /// Mean z-score of the roster in this category.
    pub avg_z: f64,
}

/// Non-punted category averages over my roster, weakest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamNeeds {
    pub categories: Vec<CategoryNeed>,
    pub roster_size: usize,
}

impl TeamNeeds {
    pub fn compute(roster: &[&NormalizedScore], categories: &[CategoryDefinition]) -> Self {
        if roster.is_empty() {
            return TeamNeeds::default();
        }
        let mut needs: Vec<CategoryNeed> = categories
            .iter()
            .filter(|c| !c.punted)
            .map(|c| {
                let sum: f64 = roster.iter().map(|s| s.z(&c.key)).sum();
                CategoryNeed {
                    key: c.key.clone(),
                    name: c.name.clone(),
                    avg_z: sum / roster.len() as f64,
                }
            })
            .collect();
        // Stable: ties keep category order.
        needs.sort_by(|a, b| a.avg_z.partial_cmp(&b.avg_z).unwrap_or(Ordering::Equal));
        TeamNeeds {
            categories: needs,
            roster_size: roster.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Keys of the `n` weakest categories.
    pub fn weakest(&self, n: usize) -> Vec<String> {
        self.categories.iter().take(n).map(|c| c.key.clone()).collect()
    }
}

/// `Z_TOTAL + bonus * Σ z` over the weakest categories.
pub fn need_score(score: &NormalizedScore, weakest: &[String], cfg: &NeedConfig) -> f64 {
    let boost: f64 = weakest.iter().map(|key| score.z(key)).sum();
    score.total + cfg.weak_category_bonus * boost
}

// ---------------------------------------------------------------------------
// Roster strength
// ---------------------------------------------------------------------------

const STRONG_CATEGORY_Z: f64 = 0.3;
const WEAK_CATEGORY_Z: f64 = -0.3;
const STRENGTH_BID_SLOPE: f64 = 0.15;
const MIN_STRENGTH_FACTOR: f64 = 0.7;
const MAX_STRENGTH_FACTOR: f64 = 1.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterStrength {
    pub avg_z: f64,
    pub strong_cats: Vec<String>,
    pub weak_cats: Vec<String>,
    pub label: &'static str,
    /// Bid multiplier: strong rosters bid conservatively, weak ones harder.
    pub bid_factor: f64,
}

impl RosterStrength {
    pub fn from_needs(needs: &TeamNeeds) -> Self {
        if needs.is_empty() {
            return RosterStrength {
                avg_z: 0.0,
                strong_cats: Vec::new(),
                weak_cats: Vec::new(),
                label: "Unknown",
                bid_factor: 1.0,
            };
        }

        let raw_avg =
            needs.categories.iter().map(|c| c.avg_z).sum::<f64>() / needs.categories.len() as f64;
        let label = if raw_avg >= 0.4 {
            "Strong roster"
        } else if raw_avg >= 0.1 {
            "Solid roster"
        } else if raw_avg >= -0.2 {
            "Average roster"
        } else if raw_avg >= -0.5 {
            "Below average"
        } else {
            "Weak roster"
        };
        let bid_factor = (1.0 - STRENGTH_BID_SLOPE * raw_avg).clamp(MIN_STRENGTH_FACTOR, MAX_STRENGTH_FACTOR);

        RosterStrength {
            avg_z: round_to(raw_avg, 2),
            strong_cats: needs
                .categories
                .iter()
                .filter(|c| c.avg_z >= STRONG_CATEGORY_Z)
                .map(|c| c.name.clone())
                .collect(),
            weak_cats: needs
                .categories
                .iter()
                .filter(|c| c.avg_z <= WEAK_CATEGORY_Z)
                .map(|c| c.name.clone())
                .collect(),
            label,
            bid_factor: round_to(bid_factor, 3),
        }
    }
}

// ---------------------------------------------------------------------------
// Drop candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropCandidate {
    pub name: String,
    /// `None` for forced names with no matched season line.
    pub z_total: Option<f64>,
    pub forced: bool,
}

/// Lowest-`Z_TOTAL` roster players (minus undroppables) plus any names the
/// configuration forces onto the list, deduplicated by normalized name.
pub fn droppable_candidates(roster: &[&NormalizedScore], cfg: &RosterConfig) -> Vec<DropCandidate> {
    let protected: BTreeSet<String> = cfg.undroppable.iter().map(|n| normalize_name(n)).collect();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();

    if cfg.auto_detect_droppable {
        let mut pool: Vec<&NormalizedScore> = roster
            .iter()
            .copied()
            .filter(|s| !protected.contains(&normalize_name(&s.name)))
            .collect();
        pool.sort_by(|a, b| a.total.partial_cmp(&b.total).unwrap_or(Ordering::Equal));
        for score in pool.into_iter().take(cfg.droppable_count) {
            if seen.insert(normalize_name(&score.name)) {
                out.push(DropCandidate {
                    name: score.name.clone(),
                    z_total: Some(score.total),
                    forced: false,
                });
            }
        }
    }

    for name in &cfg.droppable {
        let key = normalize_name(name);
        if !seen.insert(key.clone()) {
            continue;
        }
        let matched = roster.iter().find(|s| normalize_name(&s.name) == key);
        out.push(DropCandidate {
            name: matched.map_or_else(|| name.clone(), |s| s.name.clone()),
            z_total: matched.map(|s| s.total),
            forced: true,
        });
    }
    out
}

// ---------------------------------------------------------------------------
// Roster impact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterImpact {
    pub add: String,
    pub drop: String,
    /// `add − drop` per non-punted category key.
    pub deltas: BTreeMap<String, f64>,
    pub net: f64,
}

impl RosterImpact {
    pub fn compute(
        add: &NormalizedScore,
        drop: &NormalizedScore,
        categories: &[CategoryDefinition],
    ) -> Self {
        let raw: Vec<(String, f64)> = categories
            .iter()
            .filter(|c| !c.punted)
            .map(|c| (c.key.clone(), add.z(&c.key) - drop.z(&c.key)))
            .collect();
        let net = raw.iter().map(|(_, d)| d).sum::<f64>();
        RosterImpact {
            add: add.name.clone(),
            drop: drop.name.clone(),
            deltas: raw.into_iter().map(|(k, d)| (k, round_to(d, 2))).collect(),
            net: round_to(net, 2),
        }
    }

    /// Categories the swap improves, largest gain first.
    pub fn gains(&self) -> Vec<(&str, f64)> {
        let mut gains: Vec<(&str, f64)> = self
            .deltas
            .iter()
            .filter(|(_, d)| **d > 0.0)
            .map(|(k, d)| (k.as_str(), *d))
            .collect();
        gains.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        gains
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
