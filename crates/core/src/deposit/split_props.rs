//! Property-based tests for deposit net-release arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::split::DepositLedger;
use super::types::DepositSnapshot;

/// Strategy: a valid deposit split plus a claim within the deposit.
///
/// Amounts are generated in cents so every figure has at most two decimal
/// places, mirroring real deposit amounts.
fn valid_snapshot() -> impl Strategy<Value = DepositSnapshot> {
    (0i64..1_000_000i64)
        .prop_flat_map(|deposit_cents| {
            (
                Just(deposit_cents),
                0..=deposit_cents,
                0..=deposit_cents,
            )
        })
        .prop_map(|(deposit_cents, wallet_cents, claim_cents)| DepositSnapshot {
            deposit_amount: Decimal::new(deposit_cents, 2),
            deposit_from_wallet: Decimal::new(wallet_cents, 2),
            deposit_from_card: Decimal::new(deposit_cents - wallet_cents, 2),
            deposit_used_for_claim: Decimal::new(claim_cents, 2),
        })
}

proptest! {
    /// The released portions always sum to the net deposit.
    #[test]
    fn prop_release_sums_to_net_deposit(snapshot in valid_snapshot()) {
        let release = DepositLedger::net_release(&snapshot).unwrap();
        prop_assert_eq!(release.total(), snapshot.net_deposit());
    }

    /// Neither portion exceeds its funding source: the wallet never gets back
    /// more than it paid in, and the card refund never exceeds the card
    /// authorization (no double-crediting either source).
    #[test]
    fn prop_portions_bounded_by_funding_source(snapshot in valid_snapshot()) {
        let release = DepositLedger::net_release(&snapshot).unwrap();
        prop_assert!(release.wallet_portion <= snapshot.deposit_from_wallet);
        prop_assert!(release.card_portion <= snapshot.deposit_from_card);
    }

    /// Released portions are never negative.
    #[test]
    fn prop_portions_non_negative(snapshot in valid_snapshot()) {
        let release = DepositLedger::net_release(&snapshot).unwrap();
        prop_assert!(release.wallet_portion >= Decimal::ZERO);
        prop_assert!(release.card_portion >= Decimal::ZERO);
    }

    /// A claim strictly larger than the deposit is always rejected.
    #[test]
    fn prop_overclaim_rejected(
        snapshot in valid_snapshot(),
        excess_cents in 1i64..10_000i64,
    ) {
        let overclaimed = DepositSnapshot {
            deposit_used_for_claim: snapshot.deposit_amount + Decimal::new(excess_cents, 2),
            ..snapshot
        };
        prop_assert!(DepositLedger::net_release(&overclaimed).is_err());
    }
}
