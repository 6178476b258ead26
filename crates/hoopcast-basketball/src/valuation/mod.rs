// Valuation engine: z-scores, signal multipliers, composite ranking.

pub mod adjust;
pub mod availability;
pub mod hot;
pub mod injury;
pub mod needs;
pub mod news;
pub mod schedule;
pub mod zscore;

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
