//! Medicine-name matching and wishlist reconciliation.
//!
//! Pipeline: fulfillment event → first fuzzy match in wishlist → increment →
//! remove at threshold

mod name;
mod reconcile;

pub use name::*;
pub use reconcile::*;
