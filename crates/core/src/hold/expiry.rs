//! Hold expiry rule and forced forfeiture transition.

use chrono::{DateTime, Utc};

use crate::hold::error::HoldError;
use crate::settlement::{BookingStatus, TripStatus};

/// Reason text recorded on a forfeited booking.
pub const FORFEITURE_REASON: &str =
    "Hold not resolved before deadline and trip end; deposit forfeited under cancellation policy";

/// The fields of a booking the expiry rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldSnapshot {
    /// Current booking status.
    pub status: BookingStatus,
    /// Deadline by which the hold had to be resolved.
    pub hold_deadline: Option<DateTime<Utc>>,
    /// Scheduled end of the trip window.
    pub end_date: DateTime<Utc>,
}

/// A validated forfeiture transition, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryAction {
    /// Terminal status the booking moves to.
    pub new_status: BookingStatus,
    /// Trip status recorded alongside the forfeiture.
    pub new_trip_status: TripStatus,
    /// Reason recorded on the booking. No deposit refund is issued.
    pub cancellation_reason: String,
    /// When the forfeiture was decided.
    pub expired_at: DateTime<Utc>,
}

/// Stateless hold expiry rules.
pub struct HoldExpiry;

impl HoldExpiry {
    /// The scan predicate: `ON_HOLD`, deadline passed, trip window passed.
    ///
    /// A booking past its hold deadline but still within its trip window is
    /// left untouched.
    #[must_use]
    pub fn is_expirable(snapshot: &HoldSnapshot, now: DateTime<Utc>) -> bool {
        snapshot.status == BookingStatus::OnHold
            && snapshot.hold_deadline.is_some_and(|deadline| deadline < now)
            && snapshot.end_date < now
    }

    /// Validate the forced transition to `NO_SHOW`.
    ///
    /// # Errors
    ///
    /// * `HoldError::NotExpirable` if the status or dates do not qualify
    /// * `HoldError::NoDeadline` if the booking carries no hold deadline
    pub fn expire(snapshot: &HoldSnapshot, now: DateTime<Utc>) -> Result<ExpiryAction, HoldError> {
        if snapshot.status != BookingStatus::OnHold {
            return Err(HoldError::NotExpirable {
                status: snapshot.status,
            });
        }
        if snapshot.hold_deadline.is_none() {
            return Err(HoldError::NoDeadline);
        }
        if !Self::is_expirable(snapshot, now) {
            return Err(HoldError::NotExpirable {
                status: snapshot.status,
            });
        }

        Ok(ExpiryAction {
            new_status: BookingStatus::NoShow,
            new_trip_status: TripStatus::Completed,
            cancellation_reason: FORFEITURE_REASON.to_string(),
            expired_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn on_hold(deadline_offset_hours: i64, end_offset_hours: i64) -> HoldSnapshot {
        HoldSnapshot {
            status: BookingStatus::OnHold,
            hold_deadline: Some(now() + Duration::hours(deadline_offset_hours)),
            end_date: now() + Duration::hours(end_offset_hours),
        }
    }

    #[test]
    fn test_expirable_past_both_dates() {
        let snapshot = on_hold(-48, -24);
        assert!(HoldExpiry::is_expirable(&snapshot, now()));

        let action = HoldExpiry::expire(&snapshot, now()).unwrap();
        assert_eq!(action.new_status, BookingStatus::NoShow);
        assert_eq!(action.new_trip_status, TripStatus::Completed);
        assert_eq!(action.cancellation_reason, FORFEITURE_REASON);
    }

    #[test]
    fn test_past_deadline_but_trip_still_running_untouched() {
        // Scenario: deadline passed, end date still in the future.
        let snapshot = on_hold(-2, 24);
        assert!(!HoldExpiry::is_expirable(&snapshot, now()));
        assert!(matches!(
            HoldExpiry::expire(&snapshot, now()),
            Err(HoldError::NotExpirable { .. })
        ));
    }

    #[test]
    fn test_deadline_in_future_untouched() {
        let snapshot = on_hold(2, -1);
        assert!(!HoldExpiry::is_expirable(&snapshot, now()));
    }

    #[test]
    fn test_no_deadline_never_expirable() {
        let snapshot = HoldSnapshot {
            status: BookingStatus::OnHold,
            hold_deadline: None,
            end_date: now() - Duration::hours(24),
        };
        assert!(!HoldExpiry::is_expirable(&snapshot, now()));
        assert_eq!(
            HoldExpiry::expire(&snapshot, now()),
            Err(HoldError::NoDeadline)
        );
    }

    #[test]
    fn test_expired_booking_excluded_from_rescans() {
        // Once forfeited, the status is NoShow and the predicate never
        // matches again.
        let snapshot = HoldSnapshot {
            status: BookingStatus::NoShow,
            hold_deadline: Some(now() - Duration::hours(48)),
            end_date: now() - Duration::hours(24),
        };
        assert!(!HoldExpiry::is_expirable(&snapshot, now()));
        assert_eq!(
            HoldExpiry::expire(&snapshot, now()),
            Err(HoldError::NotExpirable {
                status: BookingStatus::NoShow,
            })
        );
    }

    #[test]
    fn test_non_hold_statuses_never_expirable() {
        for status in [
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Approved,
            BookingStatus::ClaimFiled,
            BookingStatus::Cancelled,
        ] {
            let snapshot = HoldSnapshot {
                status,
                hold_deadline: Some(now() - Duration::hours(48)),
                end_date: now() - Duration::hours(24),
            };
            assert!(!HoldExpiry::is_expirable(&snapshot, now()));
        }
    }
}
