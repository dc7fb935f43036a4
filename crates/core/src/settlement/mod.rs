//! Host-review state machine for deposit settlement.
//!
//! This module implements the precondition checks that make settlement
//! execute exactly once per booking:
//! - Booking and review status enums (closed sets, exhaustively matched)
//! - The approve / file-claim transition rules
//! - Error types distinguishing a lost race from an ineligible booking

pub mod error;
pub mod review;
pub mod types;

pub use error::SettlementError;
pub use review::SettlementReview;
pub use types::{
    BookingStatus, HostReviewStatus, ReviewAction, ReviewDecision, SettlementState, TripStatus,
};
