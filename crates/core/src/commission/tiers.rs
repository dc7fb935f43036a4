//! Commission tier schedule and rate calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::commission::error::CommissionError;

/// Default tier 1 lower bound (vehicles).
pub const DEFAULT_TIER1_MIN: i32 = 10;
/// Default tier 2 lower bound (vehicles).
pub const DEFAULT_TIER2_MIN: i32 = 50;
/// Default tier 3 lower bound (vehicles).
pub const DEFAULT_TIER3_MIN: i32 = 100;

/// Default base commission rate (fleet below tier 1).
pub const DEFAULT_BASE_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);
/// Default tier 1 commission rate.
pub const DEFAULT_TIER1_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
/// Default tier 2 commission rate.
pub const DEFAULT_TIER2_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);
/// Default tier 3 commission rate.
pub const DEFAULT_TIER3_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// A partner's commission tier schedule.
///
/// Defaults apply when a partner carries no custom thresholds; individual
/// overrides replace individual defaults. Tier lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSchedule {
    /// Fleet size at which tier 1 starts (inclusive).
    pub tier1_min: i32,
    /// Fleet size at which tier 2 starts (inclusive).
    pub tier2_min: i32,
    /// Fleet size at which tier 3 starts (inclusive).
    pub tier3_min: i32,
    /// Rate below tier 1.
    pub base_rate: Decimal,
    /// Rate within tier 1.
    pub tier1_rate: Decimal,
    /// Rate within tier 2.
    pub tier2_rate: Decimal,
    /// Rate within tier 3 and above.
    pub tier3_rate: Decimal,
}

impl Default for TierSchedule {
    fn default() -> Self {
        Self {
            tier1_min: DEFAULT_TIER1_MIN,
            tier2_min: DEFAULT_TIER2_MIN,
            tier3_min: DEFAULT_TIER3_MIN,
            base_rate: DEFAULT_BASE_RATE,
            tier1_rate: DEFAULT_TIER1_RATE,
            tier2_rate: DEFAULT_TIER2_RATE,
            tier3_rate: DEFAULT_TIER3_RATE,
        }
    }
}

impl TierSchedule {
    /// Builds a schedule from per-partner overrides, falling back to
    /// defaults for any missing field.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError` if the resulting thresholds are not
    /// strictly increasing or a rate is outside [0, 1].
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        tier1_min: Option<i32>,
        tier2_min: Option<i32>,
        tier3_min: Option<i32>,
        base_rate: Option<Decimal>,
        tier1_rate: Option<Decimal>,
        tier2_rate: Option<Decimal>,
        tier3_rate: Option<Decimal>,
    ) -> Result<Self, CommissionError> {
        let schedule = Self {
            tier1_min: tier1_min.unwrap_or(DEFAULT_TIER1_MIN),
            tier2_min: tier2_min.unwrap_or(DEFAULT_TIER2_MIN),
            tier3_min: tier3_min.unwrap_or(DEFAULT_TIER3_MIN),
            base_rate: base_rate.unwrap_or(DEFAULT_BASE_RATE),
            tier1_rate: tier1_rate.unwrap_or(DEFAULT_TIER1_RATE),
            tier2_rate: tier2_rate.unwrap_or(DEFAULT_TIER2_RATE),
            tier3_rate: tier3_rate.unwrap_or(DEFAULT_TIER3_RATE),
        };
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<(), CommissionError> {
        if !(self.tier1_min < self.tier2_min && self.tier2_min < self.tier3_min) {
            return Err(CommissionError::ThresholdsNotIncreasing {
                tier1: self.tier1_min,
                tier2: self.tier2_min,
                tier3: self.tier3_min,
            });
        }
        for rate in [
            self.base_rate,
            self.tier1_rate,
            self.tier2_rate,
            self.tier3_rate,
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(CommissionError::RateOutOfRange(rate));
            }
        }
        Ok(())
    }

    /// Returns the commission rate for a fleet size.
    ///
    /// Evaluates from the highest tier downward; lower bounds are inclusive.
    #[must_use]
    pub fn rate_for(&self, fleet_size: i32) -> Decimal {
        if fleet_size >= self.tier3_min {
            self.tier3_rate
        } else if fleet_size >= self.tier2_min {
            self.tier2_rate
        } else if fleet_size >= self.tier1_min {
            self.tier1_rate
        } else {
            self.base_rate
        }
    }
}

/// A commission rate change ready to be recorded.
///
/// Produced only when the recomputed rate actually differs; an unchanged
/// rate is a no-op with no history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateChange {
    /// The rate before recalculation.
    pub old_rate: Decimal,
    /// The rate after recalculation.
    pub new_rate: Decimal,
    /// The fleet size that produced the new rate.
    pub fleet_size: i32,
}

impl RateChange {
    /// Evaluates a recalculation: `Some` if the rate changed, `None` if not.
    #[must_use]
    pub fn evaluate(schedule: &TierSchedule, current_rate: Decimal, fleet_size: i32) -> Option<Self> {
        let new_rate = schedule.rate_for(fleet_size);
        if new_rate == current_rate {
            None
        } else {
            Some(Self {
                old_rate: current_rate,
                new_rate,
                fleet_size,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(0, dec!(0.25))]
    #[case(9, dec!(0.25))]
    #[case(10, dec!(0.20))] // boundary: inclusive lower bound
    #[case(12, dec!(0.20))] // Gold partner scenario
    #[case(49, dec!(0.20))]
    #[case(50, dec!(0.15))]
    #[case(99, dec!(0.15))]
    #[case(100, dec!(0.10))]
    #[case(5000, dec!(0.10))]
    fn test_default_schedule_rates(#[case] fleet: i32, #[case] expected: Decimal) {
        assert_eq!(TierSchedule::default().rate_for(fleet), expected);
    }

    #[test]
    fn test_overrides_replace_individual_fields() {
        let schedule = TierSchedule::with_overrides(
            Some(5),
            None,
            None,
            None,
            Some(dec!(0.18)),
            None,
            None,
        )
        .unwrap();
        assert_eq!(schedule.rate_for(5), dec!(0.18));
        assert_eq!(schedule.rate_for(4), dec!(0.25));
        // Untouched tiers keep defaults.
        assert_eq!(schedule.rate_for(50), dec!(0.15));
    }

    #[test]
    fn test_non_increasing_thresholds_rejected() {
        let result = TierSchedule::with_overrides(
            Some(60),
            Some(50),
            None,
            None,
            None,
            None,
            None,
        );
        assert!(matches!(
            result,
            Err(CommissionError::ThresholdsNotIncreasing { .. })
        ));
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        let result = TierSchedule::with_overrides(
            None,
            None,
            None,
            Some(dec!(1.5)),
            None,
            None,
            None,
        );
        assert_eq!(result, Err(CommissionError::RateOutOfRange(dec!(1.5))));
    }

    #[test]
    fn test_rate_change_detected() {
        let schedule = TierSchedule::default();
        let change = RateChange::evaluate(&schedule, dec!(0.25), 12).unwrap();
        assert_eq!(change.old_rate, dec!(0.25));
        assert_eq!(change.new_rate, dec!(0.20));
        assert_eq!(change.fleet_size, 12);
    }

    #[test]
    fn test_unchanged_rate_is_noop() {
        let schedule = TierSchedule::default();
        assert_eq!(RateChange::evaluate(&schedule, dec!(0.20), 12), None);
    }
}
