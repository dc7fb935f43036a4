//! Review transition rules for deposit settlement.
//!
//! A booking is settleable exactly when `status == Completed` and
//! `host_review_status == PendingReview`. Everything else is either a
//! repeat call (decision already recorded) or an ineligible booking.
//! The repository layer re-checks the same precondition with a conditional
//! update at commit time; this module is the single source of the rule.

use chrono::Utc;

use crate::settlement::error::SettlementError;
use crate::settlement::types::{
    BookingStatus, HostReviewStatus, ReviewAction, ReviewDecision,
};

/// Stateless service validating settlement review transitions.
pub struct SettlementReview;

impl SettlementReview {
    /// Validate a host approval of the deposit release.
    ///
    /// # Errors
    ///
    /// * `SettlementError::AlreadyDecided` if the review is already terminal
    /// * `SettlementError::NotEligible` for any other ineligible state
    pub fn approve(
        status: BookingStatus,
        review_status: HostReviewStatus,
    ) -> Result<ReviewAction, SettlementError> {
        Self::check_eligible(status, review_status)?;
        Ok(ReviewAction {
            decision: ReviewDecision::Approve,
            new_review_status: HostReviewStatus::Approved,
            new_booking_status: BookingStatus::Approved,
            decided_at: Utc::now(),
        })
    }

    /// Validate a host filing a claim against the deposit.
    ///
    /// No money moves on this transition; the deposit remains held until
    /// the claim resolves.
    ///
    /// # Errors
    ///
    /// * `SettlementError::AlreadyDecided` if the review is already terminal
    /// * `SettlementError::NotEligible` for any other ineligible state
    pub fn file_claim(
        status: BookingStatus,
        review_status: HostReviewStatus,
    ) -> Result<ReviewAction, SettlementError> {
        Self::check_eligible(status, review_status)?;
        Ok(ReviewAction {
            decision: ReviewDecision::FileClaim,
            new_review_status: HostReviewStatus::ClaimFiled,
            new_booking_status: BookingStatus::ClaimFiled,
            decided_at: Utc::now(),
        })
    }

    /// Validate releasing the reduced net deposit after the host's claim.
    ///
    /// Eligible only once the claim decision is on record. The repository
    /// layer additionally requires every claim on the booking to be
    /// resolved before money moves.
    ///
    /// # Errors
    ///
    /// * `SettlementError::AlreadyDecided` if the release was approved
    ///   through the normal path instead
    /// * `SettlementError::NotEligible` when no claim decision is recorded
    pub fn release_after_claim(
        status: BookingStatus,
        review_status: HostReviewStatus,
    ) -> Result<(), SettlementError> {
        match review_status {
            HostReviewStatus::ClaimFiled => Ok(()),
            HostReviewStatus::Approved => {
                Err(SettlementError::AlreadyDecided { review_status })
            }
            HostReviewStatus::PendingReview => Err(SettlementError::NotEligible {
                status,
                review_status,
            }),
        }
    }

    fn check_eligible(
        status: BookingStatus,
        review_status: HostReviewStatus,
    ) -> Result<(), SettlementError> {
        match (status, review_status) {
            (BookingStatus::Completed, HostReviewStatus::PendingReview) => Ok(()),
            // A decided review wins over any status oddity: the caller gets
            // the prior terminal state back instead of a generic conflict.
            (_, HostReviewStatus::Approved | HostReviewStatus::ClaimFiled) => {
                Err(SettlementError::AlreadyDecided { review_status })
            }
            (
                BookingStatus::Active
                | BookingStatus::OnHold
                | BookingStatus::Approved
                | BookingStatus::ClaimFiled
                | BookingStatus::NoShow
                | BookingStatus::Cancelled,
                HostReviewStatus::PendingReview,
            ) => Err(SettlementError::NotEligible {
                status,
                review_status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_completed_pending() {
        let action =
            SettlementReview::approve(BookingStatus::Completed, HostReviewStatus::PendingReview)
                .unwrap();
        assert_eq!(action.decision, ReviewDecision::Approve);
        assert_eq!(action.new_review_status, HostReviewStatus::Approved);
        assert_eq!(action.new_booking_status, BookingStatus::Approved);
    }

    #[test]
    fn test_file_claim_from_completed_pending() {
        let action = SettlementReview::file_claim(
            BookingStatus::Completed,
            HostReviewStatus::PendingReview,
        )
        .unwrap();
        assert_eq!(action.decision, ReviewDecision::FileClaim);
        assert_eq!(action.new_review_status, HostReviewStatus::ClaimFiled);
        assert_eq!(action.new_booking_status, BookingStatus::ClaimFiled);
    }

    #[test]
    fn test_second_approve_reports_prior_decision() {
        // The double-click / scheduler-race case: the second caller observes
        // the already-settled state and performs no money movement.
        let result =
            SettlementReview::approve(BookingStatus::Approved, HostReviewStatus::Approved);
        assert_eq!(
            result,
            Err(SettlementError::AlreadyDecided {
                review_status: HostReviewStatus::Approved,
            })
        );
    }

    #[test]
    fn test_approve_after_claim_reports_prior_decision() {
        let result =
            SettlementReview::approve(BookingStatus::ClaimFiled, HostReviewStatus::ClaimFiled);
        assert_eq!(
            result,
            Err(SettlementError::AlreadyDecided {
                review_status: HostReviewStatus::ClaimFiled,
            })
        );
    }

    #[test]
    fn test_release_after_claim_requires_claim_decision() {
        assert!(SettlementReview::release_after_claim(
            BookingStatus::ClaimFiled,
            HostReviewStatus::ClaimFiled,
        )
        .is_ok());
    }

    #[test]
    fn test_release_after_claim_rejects_plain_approval() {
        let result = SettlementReview::release_after_claim(
            BookingStatus::Approved,
            HostReviewStatus::Approved,
        );
        assert_eq!(
            result,
            Err(SettlementError::AlreadyDecided {
                review_status: HostReviewStatus::Approved,
            })
        );
    }

    #[test]
    fn test_release_after_claim_rejects_undecided_review() {
        let result = SettlementReview::release_after_claim(
            BookingStatus::Completed,
            HostReviewStatus::PendingReview,
        );
        assert_eq!(
            result,
            Err(SettlementError::NotEligible {
                status: BookingStatus::Completed,
                review_status: HostReviewStatus::PendingReview,
            })
        );
    }

    #[test]
    fn test_approve_ineligible_states() {
        for status in [
            BookingStatus::Active,
            BookingStatus::OnHold,
            BookingStatus::NoShow,
            BookingStatus::Cancelled,
        ] {
            let result = SettlementReview::approve(status, HostReviewStatus::PendingReview);
            assert_eq!(
                result,
                Err(SettlementError::NotEligible {
                    status,
                    review_status: HostReviewStatus::PendingReview,
                }),
                "status {status} should not be settleable"
            );
        }
    }

    #[test]
    fn test_file_claim_ineligible_states() {
        for status in [
            BookingStatus::Active,
            BookingStatus::OnHold,
            BookingStatus::NoShow,
            BookingStatus::Cancelled,
        ] {
            assert!(
                SettlementReview::file_claim(status, HostReviewStatus::PendingReview).is_err(),
                "status {status} should not accept a claim"
            );
        }
    }
}
