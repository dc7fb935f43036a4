//! Property-based tests for the commission tier schedule.

use proptest::prelude::*;

use super::tiers::TierSchedule;

proptest! {
    /// Under the default schedule, growing the fleet never raises the rate.
    #[test]
    fn prop_default_rate_non_increasing(fleet in 0i32..10_000, growth in 0i32..10_000) {
        let schedule = TierSchedule::default();
        prop_assert!(schedule.rate_for(fleet + growth) <= schedule.rate_for(fleet));
    }

    /// Every fleet size maps to exactly one of the four schedule rates.
    #[test]
    fn prop_rate_is_one_of_schedule_rates(fleet in 0i32..100_000) {
        let schedule = TierSchedule::default();
        let rate = schedule.rate_for(fleet);
        prop_assert!(
            [
                schedule.base_rate,
                schedule.tier1_rate,
                schedule.tier2_rate,
                schedule.tier3_rate
            ]
            .contains(&rate)
        );
    }

}

#[test]
fn test_thresholds_inclusive_at_lower_bound() {
    let schedule = TierSchedule::default();
    for min in [schedule.tier1_min, schedule.tier2_min, schedule.tier3_min] {
        assert_eq!(schedule.rate_for(min), schedule.rate_for(min + 1));
        assert!(schedule.rate_for(min) < schedule.rate_for(min - 1));
    }
}
