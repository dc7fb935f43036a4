//! Fleet-size commission tier engine.
//!
//! Maps a partner's active-vehicle count to a revenue-split rate.
//! Larger fleets earn a lower platform commission.

pub mod error;
pub mod tiers;

#[cfg(test)]
mod tiers_props;

pub use error::CommissionError;
pub use tiers::{RateChange, TierSchedule};
