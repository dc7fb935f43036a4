//! Settlement decision routes.
//!
//! Both decisions are idempotent per booking: repeating the recorded
//! decision returns the current state, while the opposite decision is a
//! conflict.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, routes::error_response};
use rovia_core::settlement::{BookingStatus, HostReviewStatus};
use rovia_db::SettlementOutcome;

/// Creates the settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookings/{booking_id}/settlement/approve",
            post(approve_settlement),
        )
        .route(
            "/bookings/{booking_id}/settlement/claim",
            post(file_claim),
        )
        .route(
            "/bookings/{booking_id}/settlement/release",
            post(release_after_claim),
        )
}

/// Response for a settlement decision.
#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    /// The booking the decision applies to.
    pub booking_id: Uuid,
    /// Booking status after the decision.
    pub booking_status: &'static str,
    /// Recorded host review decision.
    pub review_status: &'static str,
    /// Where the money movement stands.
    pub settlement_state: &'static str,
    /// Portion credited back to the guest's wallet.
    pub wallet_released: Decimal,
    /// Portion refunded through the payment processor.
    pub card_released: Decimal,
    /// Total net release.
    pub total_released: Decimal,
    /// Processor refund id, when the card portion was confirmed.
    pub refund_id: Option<String>,
    /// False if the approval is committed but money movement is pending.
    pub release_complete: bool,
    /// True if this call repeated an already-recorded decision.
    pub already_decided: bool,
}

impl From<&SettlementOutcome> for SettlementResponse {
    fn from(outcome: &SettlementOutcome) -> Self {
        Self {
            booking_id: outcome.booking.id,
            booking_status: BookingStatus::from(outcome.booking.status.clone()).as_str(),
            review_status: HostReviewStatus::from(outcome.booking.host_review_status.clone())
                .as_str(),
            settlement_state: outcome.settlement_state.as_str(),
            wallet_released: outcome.net_release.wallet_portion,
            card_released: outcome.net_release.card_portion,
            total_released: outcome.net_release.total(),
            refund_id: outcome.refund.as_ref().map(|r| r.refund_id.clone()),
            release_complete: outcome.release_complete,
            already_decided: outcome.already_decided,
        }
    }
}

/// POST /bookings/{id}/settlement/approve - Host approves; deposit released.
async fn approve_settlement(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.settlement.approve(booking_id).await {
        Ok(outcome) => {
            info!(
                booking_id = %booking_id,
                settlement_state = %outcome.settlement_state,
                release_complete = outcome.release_complete,
                "settlement approval processed"
            );
            (StatusCode::OK, Json(SettlementResponse::from(&outcome))).into_response()
        }
        Err(e) => {
            error!(error = %e, booking_id = %booking_id, "settlement approval failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// POST /bookings/{id}/settlement/release - Release the reduced net deposit.
///
/// The claims boundary triggers this automatically when the last claim
/// resolves; the route exists so a deferred or failed release can be
/// retried without re-applying the deduction.
async fn release_after_claim(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.settlement.release_after_claim(booking_id).await {
        Ok(outcome) => {
            info!(
                booking_id = %booking_id,
                settlement_state = %outcome.settlement_state,
                release_complete = outcome.release_complete,
                "post-claim release processed"
            );
            (StatusCode::OK, Json(SettlementResponse::from(&outcome))).into_response()
        }
        Err(e) => {
            error!(error = %e, booking_id = %booking_id, "post-claim release failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// POST /bookings/{id}/settlement/claim - Host files a claim; release blocked.
async fn file_claim(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.settlement.file_claim(booking_id).await {
        Ok(outcome) => {
            info!(booking_id = %booking_id, "claim filed against deposit");
            (StatusCode::OK, Json(SettlementResponse::from(&outcome))).into_response()
        }
        Err(e) => {
            error!(error = %e, booking_id = %booking_id, "claim filing failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}
