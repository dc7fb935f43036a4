//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` in major units (e.g. dollars);
//! the payment processor wire format wants integer minor units (cents).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Errors converting decimal amounts to wire formats.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// Amount is negative where a non-negative amount is required.
    #[error("Amount must not be negative: {0}")]
    Negative(Decimal),

    /// Amount has sub-cent precision that would be lost on the wire.
    #[error("Amount {0} is not representable in minor units")]
    SubMinorPrecision(Decimal),

    /// Amount does not fit in an i64 of minor units.
    #[error("Amount {0} overflows minor units")]
    Overflow(Decimal),
}

/// Converts a major-unit decimal amount to integer minor units (cents).
///
/// Rejects negative amounts and amounts with more than two decimal places
/// rather than rounding silently: sub-cent residue at this boundary means an
/// upstream invariant was already broken.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() {
        return Err(MoneyError::Negative(amount));
    }
    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::Overflow(amount))?;
    if scaled.fract() != Decimal::ZERO {
        return Err(MoneyError::SubMinorPrecision(amount));
    }
    scaled.to_i64().ok_or(MoneyError::Overflow(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_whole_dollars() {
        assert_eq!(to_minor_units(dec!(500)), Ok(50_000));
        assert_eq!(to_minor_units(dec!(0)), Ok(0));
    }

    #[test]
    fn test_cents() {
        assert_eq!(to_minor_units(dec!(12.34)), Ok(1_234));
        assert_eq!(to_minor_units(dec!(0.01)), Ok(1));
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            to_minor_units(dec!(-1)),
            Err(MoneyError::Negative(dec!(-1)))
        );
    }

    #[test]
    fn test_sub_cent_rejected() {
        assert_eq!(
            to_minor_units(dec!(1.005)),
            Err(MoneyError::SubMinorPrecision(dec!(1.005)))
        );
    }
}
