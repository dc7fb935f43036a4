//! Hold expiry rules for provisional bookings.
//!
//! A booking `ON_HOLD` past its hold deadline **and** past its trip end
//! date is forfeited to `NO_SHOW`. Past-deadline bookings still inside the
//! trip window are left alone - the guest may yet resolve the hold.

pub mod error;
pub mod expiry;

pub use error::HoldError;
pub use expiry::{ExpiryAction, HoldExpiry, HoldSnapshot};
