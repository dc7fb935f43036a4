//! Deposit domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The deposit figures of a single booking, as read from storage.
///
/// All amounts are in the platform currency's major units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSnapshot {
    /// Total deposit taken at booking time.
    pub deposit_amount: Decimal,
    /// Portion funded from the guest's wallet balance.
    pub deposit_from_wallet: Decimal,
    /// Portion funded from a card authorization.
    pub deposit_from_card: Decimal,
    /// Total approved claim deductions applied so far.
    pub deposit_used_for_claim: Decimal,
}

impl DepositSnapshot {
    /// The amount still releasable after claim deductions.
    #[must_use]
    pub fn net_deposit(&self) -> Decimal {
        self.deposit_amount - self.deposit_used_for_claim
    }
}

/// How a net release splits across the two funding sources.
///
/// Wallet money comes back as wallet credit; the remainder goes back to the
/// card via the payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetRelease {
    /// Amount credited back to the guest's wallet.
    pub wallet_portion: Decimal,
    /// Amount refunded through the payment processor.
    pub card_portion: Decimal,
}

impl NetRelease {
    /// Total amount released, regardless of funding source.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.wallet_portion + self.card_portion
    }

    /// Returns true if nothing is releasable (deposit fully consumed).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.wallet_portion.is_zero() && self.card_portion.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_net_deposit() {
        let snapshot = DepositSnapshot {
            deposit_amount: dec!(500),
            deposit_from_wallet: dec!(200),
            deposit_from_card: dec!(300),
            deposit_used_for_claim: dec!(150),
        };
        assert_eq!(snapshot.net_deposit(), dec!(350));
    }

    #[test]
    fn test_net_release_total() {
        let release = NetRelease {
            wallet_portion: dec!(200),
            card_portion: dec!(150),
        };
        assert_eq!(release.total(), dec!(350));
        assert!(!release.is_zero());
    }

    #[test]
    fn test_net_release_zero() {
        let release = NetRelease {
            wallet_portion: Decimal::ZERO,
            card_portion: Decimal::ZERO,
        };
        assert!(release.is_zero());
        assert_eq!(release.total(), Decimal::ZERO);
    }
}
