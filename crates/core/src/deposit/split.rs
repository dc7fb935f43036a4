//! Net-release computation for a booking's deposit.
//!
//! The deposit is one money pool funded from two sources. When it is
//! released, wallet-funded money returns to the wallet first and only the
//! remainder goes back to the card, so a claim deduction eats into the card
//! portion before it touches the wallet portion.

use rust_decimal::Decimal;

use super::error::DepositError;
use super::types::{DepositSnapshot, NetRelease};

/// Stateless deposit arithmetic.
///
/// Pure functions only; persistence of the resulting figures is the
/// repository layer's concern.
pub struct DepositLedger;

impl DepositLedger {
    /// Compute the releasable split for a booking.
    ///
    /// Invariants enforced:
    /// - `deposit_from_wallet + deposit_from_card == deposit_amount`
    /// - `deposit_used_for_claim <= deposit_amount`
    /// - all figures non-negative
    ///
    /// The result satisfies
    /// `wallet_portion = min(deposit_from_wallet, net_deposit)` and
    /// `card_portion = net_deposit - wallet_portion`.
    ///
    /// # Errors
    ///
    /// Returns `DepositError` if any invariant is violated.
    pub fn net_release(snapshot: &DepositSnapshot) -> Result<NetRelease, DepositError> {
        Self::validate(snapshot)?;

        let net_deposit = snapshot.net_deposit();
        let wallet_portion = snapshot.deposit_from_wallet.min(net_deposit);
        let card_portion = net_deposit - wallet_portion;

        Ok(NetRelease {
            wallet_portion,
            card_portion,
        })
    }

    /// Validate the deposit figures of a booking.
    ///
    /// # Errors
    ///
    /// Returns `DepositError` if the split does not sum to the deposit
    /// amount, a figure is negative, or claims exceed the deposit.
    pub fn validate(snapshot: &DepositSnapshot) -> Result<(), DepositError> {
        for figure in [
            snapshot.deposit_amount,
            snapshot.deposit_from_wallet,
            snapshot.deposit_from_card,
            snapshot.deposit_used_for_claim,
        ] {
            if figure < Decimal::ZERO {
                return Err(DepositError::NegativeAmount(figure));
            }
        }

        if snapshot.deposit_from_wallet + snapshot.deposit_from_card != snapshot.deposit_amount {
            return Err(DepositError::SplitMismatch {
                wallet: snapshot.deposit_from_wallet,
                card: snapshot.deposit_from_card,
                deposit: snapshot.deposit_amount,
            });
        }

        if snapshot.deposit_used_for_claim > snapshot.deposit_amount {
            return Err(DepositError::ClaimExceedsDeposit {
                claim: snapshot.deposit_used_for_claim,
                deposit: snapshot.deposit_amount,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(
        deposit: Decimal,
        wallet: Decimal,
        card: Decimal,
        claim: Decimal,
    ) -> DepositSnapshot {
        DepositSnapshot {
            deposit_amount: deposit,
            deposit_from_wallet: wallet,
            deposit_from_card: card,
            deposit_used_for_claim: claim,
        }
    }

    #[test]
    fn test_full_release_no_claim() {
        let release =
            DepositLedger::net_release(&snapshot(dec!(500), dec!(200), dec!(300), dec!(0)))
                .unwrap();
        assert_eq!(release.wallet_portion, dec!(200));
        assert_eq!(release.card_portion, dec!(300));
        assert_eq!(release.total(), dec!(500));
    }

    #[test]
    fn test_claim_reduces_card_before_wallet() {
        // Deposit $500 ($200 wallet / $300 card), claim deducts $150:
        // net $350 -> wallet portion min(200, 350) = $200, card portion $150.
        let release =
            DepositLedger::net_release(&snapshot(dec!(500), dec!(200), dec!(300), dec!(150)))
                .unwrap();
        assert_eq!(release.wallet_portion, dec!(200));
        assert_eq!(release.card_portion, dec!(150));
    }

    #[test]
    fn test_claim_eats_into_wallet_portion() {
        // Claim larger than the card-funded portion squeezes the wallet side.
        let release =
            DepositLedger::net_release(&snapshot(dec!(500), dec!(200), dec!(300), dec!(400)))
                .unwrap();
        assert_eq!(release.wallet_portion, dec!(100));
        assert_eq!(release.card_portion, dec!(0));
    }

    #[test]
    fn test_claim_consumes_entire_deposit() {
        let release =
            DepositLedger::net_release(&snapshot(dec!(500), dec!(200), dec!(300), dec!(500)))
                .unwrap();
        assert!(release.is_zero());
    }

    #[test]
    fn test_claim_exceeding_deposit_rejected() {
        let result =
            DepositLedger::net_release(&snapshot(dec!(500), dec!(200), dec!(300), dec!(501)));
        assert_eq!(
            result,
            Err(DepositError::ClaimExceedsDeposit {
                claim: dec!(501),
                deposit: dec!(500),
            })
        );
    }

    #[test]
    fn test_split_mismatch_rejected() {
        let result =
            DepositLedger::net_release(&snapshot(dec!(500), dec!(100), dec!(300), dec!(0)));
        assert!(matches!(result, Err(DepositError::SplitMismatch { .. })));
    }

    #[test]
    fn test_negative_figure_rejected() {
        let result =
            DepositLedger::net_release(&snapshot(dec!(500), dec!(-200), dec!(700), dec!(0)));
        assert_eq!(result, Err(DepositError::NegativeAmount(dec!(-200))));
    }

    #[test]
    fn test_wallet_only_deposit() {
        let release =
            DepositLedger::net_release(&snapshot(dec!(300), dec!(300), dec!(0), dec!(50)))
                .unwrap();
        assert_eq!(release.wallet_portion, dec!(250));
        assert_eq!(release.card_portion, dec!(0));
    }

    #[test]
    fn test_card_only_deposit() {
        let release =
            DepositLedger::net_release(&snapshot(dec!(300), dec!(0), dec!(300), dec!(50)))
                .unwrap();
        assert_eq!(release.wallet_portion, dec!(0));
        assert_eq!(release.card_portion, dec!(250));
    }
}
