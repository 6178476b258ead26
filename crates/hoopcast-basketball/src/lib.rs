// Fantasy basketball waiver engine: category z-scores, composite
// adjustments, bid-history tiers and FAAB bid suggestions.

pub mod bidding;
pub mod pipeline;
pub mod valuation;
