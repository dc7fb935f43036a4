//! Deposit ledger arithmetic.
//!
//! This module implements the invariant-checking logic for a booking's
//! security deposit:
//! - Funding split validation (wallet portion + card portion = deposit)
//! - Claim deduction bounds
//! - Net-releasable split across the two funding sources

pub mod error;
pub mod split;
pub mod types;

#[cfg(test)]
mod split_props;

pub use error::DepositError;
pub use split::DepositLedger;
pub use types::{DepositSnapshot, NetRelease};
