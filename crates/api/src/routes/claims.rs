//! Claim application routes.
//!
//! The claims subsystem adjudicates damage claims elsewhere; this boundary
//! applies an approved deduction to the booking's deposit, at most once per
//! claim.

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
use rovia_core::settlement::SettlementError;
use rovia_db::{ClaimRepository, SettlementOutcome};

/// Creates the claim routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/bookings/{booking_id}/claims/{claim_id}/apply",
        post(apply_claim),
    )
}

/// Response after an approved deduction is applied.
#[derive(Debug, Serialize)]
pub struct ClaimApplicationResponse {
    /// The booking whose deposit was deducted.
    pub booking_id: Uuid,
    /// The applied claim.
    pub claim_id: Uuid,
    /// Total deposit taken at booking time.
    pub deposit_amount: Decimal,
    /// Cumulative deductions applied against the deposit.
    pub deposit_used_for_claim: Decimal,
    /// Where the money movement stands after this application.
    pub settlement_state: &'static str,
    /// Portion credited back to the guest's wallet, when released.
    pub wallet_released: Decimal,
    /// Portion refunded through the payment processor, when released.
    pub card_released: Decimal,
    /// True once the reduced net deposit was fully released.
    pub release_complete: bool,
}

/// POST /bookings/{id}/claims/{claim_id}/apply - Apply an approved deduction.
async fn apply_claim(
    State(state): State<AppState>,
    Path((booking_id, claim_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = ClaimRepository::new((*state.db).clone());

    let booking = match repo.deduct_for_claim(booking_id, claim_id).await {
        Ok(booking) => booking,
        Err(e) => {
            error!(error = %e, booking_id = %booking_id, claim_id = %claim_id, "claim deduction failed");
            return error_response(e.status_code(), e.error_code(), &e.to_string());
        }
    };
    info!(
        booking_id = %booking_id,
        claim_id = %claim_id,
        deposit_used_for_claim = %booking.deposit_used_for_claim,
        "claim deduction applied"
    );

    // If this was the last unresolved claim, the reduced net deposit goes
    // out now. The deduction above is already committed, so a failed or
    // deferred release is retried through the settlement release route
    // rather than failing this request.
    let release = match state.settlement.release_after_claim(booking_id).await {
        Ok(outcome) => Some(outcome),
        Err(SettlementError::ClaimsUnresolved { open_claims, .. }) => {
            info!(
                booking_id = %booking_id,
                open_claims,
                "deduction applied; release waits on remaining claims"
            );
            None
        }
        Err(e) => {
            error!(error = %e, booking_id = %booking_id, "post-claim release failed; deduction stands");
            None
        }
    };

    (
        StatusCode::OK,
        Json(response(booking_id, claim_id, &booking, release.as_ref())),
    )
        .into_response()
}

fn response(
    booking_id: Uuid,
    claim_id: Uuid,
    booking: &rovia_db::entities::bookings::Model,
    release: Option<&SettlementOutcome>,
) -> ClaimApplicationResponse {
    let (settlement_state, wallet_released, card_released, release_complete) = release
        .map_or(("pending", Decimal::ZERO, Decimal::ZERO, false), |outcome| {
            (
                outcome.settlement_state.as_str(),
                outcome.net_release.wallet_portion,
                outcome.net_release.card_portion,
                outcome.release_complete,
            )
        });

    ClaimApplicationResponse {
        booking_id,
        claim_id,
        deposit_amount: booking.deposit_amount,
        deposit_used_for_claim: booking.deposit_used_for_claim,
        settlement_state,
        wallet_released,
        card_released,
        release_complete,
    }
}
