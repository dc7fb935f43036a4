//! Payment processor boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the payment processor boundary.
///
/// A timeout is indistinguishable from a slow success; any retry must reuse
/// the same idempotency key so the processor de-duplicates.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The processor rejected the release request.
    #[error("Processor rejected release for booking {booking_id}: {reason}")]
    Rejected {
        /// The booking whose release was rejected.
        booking_id: Uuid,
        /// Processor-supplied reason.
        reason: String,
    },

    /// The call failed or timed out; outcome unknown.
    #[error("Processor call failed: {0}")]
    Transport(String),
}

/// A processor confirmation of a card-portion refund.
///
/// This confirmation is the only source of truth for "card portion
/// refunded".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRecord {
    /// Processor-side refund identifier.
    pub refund_id: String,
    /// Amount refunded, in minor units.
    pub amount_minor: i64,
    /// The idempotency key the refund was recorded under.
    pub idempotency_key: String,
    /// When the processor confirmed the refund.
    pub confirmed_at: DateTime<Utc>,
}

/// External payment processor: releases the card portion of a deposit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Release `amount_minor` back to the card that funded the deposit.
    ///
    /// Must be called with an idempotency key derived from the booking id;
    /// the network layer is at-least-once and the processor de-duplicates
    /// on the key.
    async fn release(
        &self,
        booking_id: Uuid,
        amount_minor: i64,
    ) -> Result<RefundRecord, ProcessorError>;
}

/// The idempotency key for a booking's deposit release.
///
/// One logical release per booking; a retry of the same release reuses
/// this exact key.
#[must_use]
pub fn release_idempotency_key(booking_id: Uuid) -> String {
    format!("deposit-release-{booking_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_stable_per_booking() {
        let id = Uuid::new_v4();
        assert_eq!(release_idempotency_key(id), release_idempotency_key(id));
        assert_ne!(
            release_idempotency_key(id),
            release_idempotency_key(Uuid::new_v4())
        );
    }

    #[tokio::test]
    async fn test_mock_processor_release() {
        let booking_id = Uuid::new_v4();
        let mut processor = MockPaymentProcessor::new();
        processor
            .expect_release()
            .withf(move |id, amount| *id == booking_id && *amount == 15_000)
            .times(1)
            .returning(|booking_id, amount_minor| {
                Ok(RefundRecord {
                    refund_id: "re_123".to_string(),
                    amount_minor,
                    idempotency_key: release_idempotency_key(booking_id),
                    confirmed_at: Utc::now(),
                })
            });

        let record = processor.release(booking_id, 15_000).await.unwrap();
        assert_eq!(record.amount_minor, 15_000);
        assert_eq!(record.idempotency_key, release_idempotency_key(booking_id));
    }
}
