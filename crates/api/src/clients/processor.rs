//! Payment processor HTTP client.
//!
//! The network layer is at-least-once: a timed-out call may still have
//! succeeded on the processor side, so every request carries the booking's
//! stable idempotency key and the processor de-duplicates on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use rovia_core::external::processor::{
    PaymentProcessor, ProcessorError, RefundRecord, release_idempotency_key,
};
use rovia_shared::config::ProcessorConfig;

/// HTTP client for the card refund API.
#[derive(Debug, Clone)]
pub struct HttpPaymentProcessor {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Processor-side refund confirmation body.
#[derive(Debug, Deserialize)]
struct RefundResponse {
    refund_id: String,
    amount_minor: i64,
    confirmed_at: DateTime<Utc>,
}

impl HttpPaymentProcessor {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ProcessorConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PaymentProcessor for HttpPaymentProcessor {
    async fn release(
        &self,
        booking_id: Uuid,
        amount_minor: i64,
    ) -> Result<RefundRecord, ProcessorError> {
        let idempotency_key = release_idempotency_key(booking_id);
        let url = format!("{}/v1/refunds", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", &idempotency_key)
            .json(&json!({
                "booking_id": booking_id,
                "amount_minor": amount_minor,
            }))
            .send()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(ProcessorError::Rejected { booking_id, reason });
        }
        if !status.is_success() {
            return Err(ProcessorError::Transport(format!(
                "processor returned {status}"
            )));
        }

        let body: RefundResponse = response
            .json()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        info!(
            booking_id = %booking_id,
            refund_id = %body.refund_id,
            amount_minor = body.amount_minor,
            "processor confirmed refund"
        );

        Ok(RefundRecord {
            refund_id: body.refund_id,
            amount_minor: body.amount_minor,
            idempotency_key,
            confirmed_at: body.confirmed_at,
        })
    }
}
