//! Deposit ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur when computing deposit splits and releases.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepositError {
    /// The funding split does not add up to the deposit amount.
    #[error("Funding split {wallet} + {card} does not equal deposit {deposit}")]
    SplitMismatch {
        /// Wallet-funded portion.
        wallet: Decimal,
        /// Card-funded portion.
        card: Decimal,
        /// Total deposit amount.
        deposit: Decimal,
    },

    /// Claim deductions exceed the deposit amount.
    #[error("Claim deduction {claim} exceeds deposit {deposit}")]
    ClaimExceedsDeposit {
        /// Total claim deductions.
        claim: Decimal,
        /// Total deposit amount.
        deposit: Decimal,
    },

    /// A deposit figure is negative.
    #[error("Deposit figure must not be negative: {0}")]
    NegativeAmount(Decimal),
}

impl DepositError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::SplitMismatch { .. } | Self::NegativeAmount(_) => 500,
            Self::ClaimExceedsDeposit { .. } => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SplitMismatch { .. } => "DEPOSIT_SPLIT_MISMATCH",
            Self::ClaimExceedsDeposit { .. } => "CLAIM_EXCEEDS_DEPOSIT",
            Self::NegativeAmount(_) => "NEGATIVE_DEPOSIT_FIGURE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_claim_exceeds_deposit_error() {
        let err = DepositError::ClaimExceedsDeposit {
            claim: dec!(600),
            deposit: dec!(500),
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "CLAIM_EXCEEDS_DEPOSIT");
        assert!(err.to_string().contains("600"));
    }

    #[test]
    fn test_split_mismatch_error() {
        let err = DepositError::SplitMismatch {
            wallet: dec!(100),
            card: dec!(100),
            deposit: dec!(500),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "DEPOSIT_SPLIT_MISMATCH");
    }
}
