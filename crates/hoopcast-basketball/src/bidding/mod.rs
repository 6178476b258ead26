// FAAB bidding: bid-history tiers, budget health, weekly limits and
// per-candidate bid suggestions.

pub mod budget;
pub mod history;
pub mod limits;
pub mod suggest;
pub mod tiers;
