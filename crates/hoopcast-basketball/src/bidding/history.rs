// League bid history: outlier split, per-tier statistics, team spending.
//
// Premium bids (returning stars and similar outliers) are kept apart so
// they never inflate the statistics used to price ordinary pickups.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hoopcast_core::config::BiddingConfig;
use hoopcast_core::records::HistoricalBidRecord;
use serde::Serialize;
use tracing::{debug, info};

use super::tiers::{TierTable, UNKNOWN_TIER};
use crate::valuation::round_to;

/// Below this many bids there is no quartile split.
const MIN_BIDS_FOR_OUTLIERS: usize = 4;

// ---------------------------------------------------------------------------
// Outlier split
// ---------------------------------------------------------------------------

/// Premium threshold `max(Q3 + factor × IQR, floor)` using integer-index
/// quartiles. `None` with fewer than four bids.
pub fn premium_threshold(amounts: &[u32], iqr_factor: f64, floor: f64) -> Option<f64> {
    if amounts.len() < MIN_BIDS_FOR_OUTLIERS {
        return None;
    }
    let mut sorted = amounts.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    let q1 = sorted[n / 4] as f64;
    let q3 = sorted[3 * n / 4] as f64;
    let fence = q3 + iqr_factor * (q3 - q1);
    Some(fence.max(floor))
}

/// `(standard, premium, threshold)`; every amount lands in exactly one side.
pub fn split_outliers(amounts: &[u32], iqr_factor: f64, floor: f64) -> (Vec<u32>, Vec<u32>, Option<f64>) {
    let Some(threshold) = premium_threshold(amounts, iqr_factor, floor) else {
        return (amounts.to_vec(), Vec::new(), None);
    };
    let (premium, standard): (Vec<u32>, Vec<u32>) =
        amounts.iter().partition(|a| **a as f64 >= threshold);
    (standard, premium, Some(threshold))
}

// ---------------------------------------------------------------------------
// Distribution statistics
// ---------------------------------------------------------------------------

fn mean(values: &[u32]) -> f64 {
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

/// Median of an ascending slice, averaging the middle pair.
fn median_sorted(sorted: &[u32]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}

fn sample_stdev(values: &[u32]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (*v as f64 - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Standard-bid statistics for one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: u32,
    pub max: u32,
    /// Integer-index quartiles, present from four bids up.
    pub p25: Option<u32>,
    pub p75: Option<u32>,
}

impl TierStats {
    pub fn from_amounts(amounts: &[u32]) -> Option<Self> {
        if amounts.is_empty() {
            return None;
        }
        let mut sorted = amounts.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();
        let quartiles = n >= MIN_BIDS_FOR_OUTLIERS;
        Some(TierStats {
            count: n,
            mean: round_to(mean(&sorted), 1),
            median: round_to(median_sorted(&sorted), 1),
            min: sorted[0],
            max: sorted[n - 1],
            p25: quartiles.then(|| sorted[n / 4]),
            p75: quartiles.then(|| sorted[3 * n / 4]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidSummary {
    pub total_transactions: usize,
    pub faab_bids: usize,
    pub free_pickups: usize,
    pub standard_count: usize,
    pub premium_count: usize,
    pub premium_threshold: Option<f64>,
    /// Standard-bid statistics; `None` without standard bids.
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<u32>,
    pub min: Option<u32>,
    pub stdev: Option<f64>,
    /// Over every non-zero bid, premium included.
    pub raw_mean: Option<f64>,
    pub raw_max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSpending {
    pub team: String,
    pub total_spent: u32,
    pub num_bids: usize,
    pub avg_bid: f64,
    pub max_bid: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: u32,
    pub max: u32,
}

impl PremiumSummary {
    fn from_amounts(amounts: &[u32]) -> Option<Self> {
        let stats = TierStats::from_amounts(amounts)?;
        Some(PremiumSummary {
            count: stats.count,
            mean: stats.mean,
            median: stats.median,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// One historical add with its current tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedBid {
    pub player_name: String,
    pub amount: u32,
    pub team: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Candidate score the tier came from; `None` when unmatched.
    pub score: Option<f64>,
    pub tier: String,
    pub premium: bool,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidHistoryAnalysis {
    pub summary: BidSummary,
    pub by_tier: BTreeMap<String, TierStats>,
    /// Sorted by total spent, highest first.
    pub by_team: Vec<TeamSpending>,
    /// Every record, highest bid first.
    pub bids: Vec<ClassifiedBid>,
    pub premium: Option<PremiumSummary>,
    pub tiers: TierTable,
}

impl BidHistoryAnalysis {
    /// Classify and summarize `records`.
    ///
    /// `score_for` resolves a player name to the score used for tiering;
    /// unresolved players keep their bid in every aggregate but sit in the
    /// `Unknown` tier. $0 pickups are counted and otherwise ignored.
    pub fn analyze(
        records: &[HistoricalBidRecord],
        score_for: &dyn Fn(&str) -> Option<f64>,
        tiers: TierTable,
        cfg: &BiddingConfig,
    ) -> Self {
        let paid: Vec<u32> = records.iter().map(|r| r.amount).filter(|a| *a > 0).collect();
        let threshold = premium_threshold(&paid, cfg.outlier_iqr_factor, cfg.premium_floor);

        let mut bids: Vec<ClassifiedBid> = records
            .iter()
            .map(|r| {
                let score = score_for(&r.player_name);
                ClassifiedBid {
                    player_name: r.player_name.clone(),
                    amount: r.amount,
                    team: r.team.clone(),
                    timestamp: r.timestamp,
                    score,
                    tier: score.map_or_else(|| UNKNOWN_TIER.to_string(), |s| tiers.assign(s).to_string()),
                    premium: r.amount > 0 && threshold.is_some_and(|t| r.amount as f64 >= t),
                }
            })
            .collect();
        bids.sort_by(|a, b| b.amount.cmp(&a.amount));

        let standard: Vec<&ClassifiedBid> = bids.iter().filter(|b| b.amount > 0 && !b.premium).collect();
        let standard_amounts: Vec<u32> = standard.iter().map(|b| b.amount).collect();
        let premium_amounts: Vec<u32> = bids.iter().filter(|b| b.premium).map(|b| b.amount).collect();

        let mut tier_amounts: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for bid in &standard {
            tier_amounts.entry(bid.tier.clone()).or_default().push(bid.amount);
        }
        let by_tier: BTreeMap<String, TierStats> = tier_amounts
            .iter()
            .filter_map(|(tier, amounts)| Some((tier.clone(), TierStats::from_amounts(amounts)?)))
            .collect();

        let standard_stats = TierStats::from_amounts(&standard_amounts);
        let summary = BidSummary {
            total_transactions: records.len(),
            faab_bids: paid.len(),
            free_pickups: records.len() - paid.len(),
            standard_count: standard_amounts.len(),
            premium_count: premium_amounts.len(),
            premium_threshold: threshold,
            mean: standard_stats.as_ref().map(|s| s.mean),
            median: standard_stats.as_ref().map(|s| s.median),
            max: standard_stats.as_ref().map(|s| s.max),
            min: standard_stats.as_ref().map(|s| s.min),
            stdev: (standard_amounts.len() >= 2).then(|| round_to(sample_stdev(&standard_amounts), 1)),
            raw_mean: (!paid.is_empty()).then(|| round_to(mean(&paid), 1)),
            raw_max: paid.iter().max().copied(),
        };

        info!(
            "bid history: {} paid bids ({} standard, {} premium), {} free pickups",
            summary.faab_bids, summary.standard_count, summary.premium_count, summary.free_pickups
        );
        debug!("premium threshold: {:?}", threshold);

        BidHistoryAnalysis {
            summary,
            by_tier,
            by_team: team_spending(&bids),
            premium: PremiumSummary::from_amounts(&premium_amounts),
            bids,
            tiers,
        }
    }

    pub fn tier_stats(&self, tier: &str) -> Option<&TierStats> {
        self.by_tier.get(tier)
    }

    /// Median of the standard bids, when there are any.
    pub fn league_median(&self) -> Option<f64> {
        self.summary.median
    }

    pub fn standard_bids(&self) -> impl Iterator<Item = &ClassifiedBid> {
        self.bids.iter().filter(|b| b.amount > 0 && !b.premium)
    }

    pub fn premium_bids(&self) -> impl Iterator<Item = &ClassifiedBid> {
        self.bids.iter().filter(|b| b.premium)
    }
}

fn team_spending(bids: &[ClassifiedBid]) -> Vec<TeamSpending> {
    let mut per_team: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for bid in bids.iter().filter(|b| b.amount > 0) {
        per_team.entry(bid.team.as_str()).or_default().push(bid.amount);
    }
    let mut out: Vec<TeamSpending> = per_team
        .into_iter()
        .map(|(team, amounts)| {
            let total: u32 = amounts.iter().sum();
            TeamSpending {
                team: team.to_string(),
                total_spent: total,
                num_bids: amounts.len(),
                avg_bid: round_to(total as f64 / amounts.len() as f64, 1),
                max_bid: amounts.iter().max().copied().unwrap_or(0),
            }
        })
        .collect();
    out.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
