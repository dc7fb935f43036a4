//! Partner commission routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, routes::error_response};
use rovia_db::PartnerRepository;
use rovia_db::entities::commission_history;

/// Creates the partner routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/partners/{partner_id}/commission/recalculate",
            post(recalculate_commission),
        )
        .route(
            "/partners/{partner_id}/commission/history",
            get(list_commission_history),
        )
}

/// One recorded commission rate change.
#[derive(Debug, Serialize)]
pub struct RateChangeResponse {
    /// Rate before the change.
    pub old_rate: Decimal,
    /// Rate after the change.
    pub new_rate: Decimal,
    /// Fleet size the new rate was computed from.
    pub fleet_size: i32,
    /// Why the rate changed.
    pub reason: String,
    /// Operator who triggered the change, if any.
    pub changed_by: Option<Uuid>,
    /// When the change was recorded.
    pub changed_at: DateTime<FixedOffset>,
}

impl From<commission_history::Model> for RateChangeResponse {
    fn from(model: commission_history::Model) -> Self {
        Self {
            old_rate: model.old_rate,
            new_rate: model.new_rate,
            fleet_size: model.fleet_size,
            reason: model.reason,
            changed_by: model.changed_by,
            changed_at: model.created_at,
        }
    }
}

/// Response for a recalculation request.
#[derive(Debug, Serialize)]
pub struct RecalculationResponse {
    /// The partner that was recalculated.
    pub partner_id: Uuid,
    /// Current commission rate after recalculation.
    pub commission_rate: Decimal,
    /// Active vehicle count the rate was derived from.
    pub fleet_size: i32,
    /// True if the rate moved; false for a no-op recount.
    pub changed: bool,
    /// The recorded change, when one happened.
    pub change: Option<RateChangeResponse>,
}

/// POST /partners/{id}/commission/recalculate - Recount and re-tier.
///
/// Recounts active vehicles and applies the tier schedule. An unchanged
/// rate is a no-op: no history row, no audit entry.
async fn recalculate_commission(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PartnerRepository::new((*state.db).clone());

    let change = match repo
        .recalculate(partner_id, None, "manual_recalculation")
        .await
    {
        Ok(change) => change,
        Err(e) => {
            error!(error = %e, partner_id = %partner_id, "commission recalculation failed");
            return error_response(e.status_code(), e.error_code(), &e.to_string());
        }
    };

    match repo.find_by_id(partner_id).await {
        Ok(partner) => {
            info!(
                partner_id = %partner_id,
                commission_rate = %partner.commission_rate,
                fleet_size = partner.fleet_size,
                changed = change.is_some(),
                "commission recalculated"
            );
            (
                StatusCode::OK,
                Json(RecalculationResponse {
                    partner_id,
                    commission_rate: partner.commission_rate,
                    fleet_size: partner.fleet_size,
                    changed: change.is_some(),
                    change: change.map(Into::into),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, partner_id = %partner_id, "partner lookup failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// GET /partners/{id}/commission/history - Rate changes, newest first.
async fn list_commission_history(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PartnerRepository::new((*state.db).clone());

    match repo.history(partner_id).await {
        Ok(changes) => {
            let changes: Vec<RateChangeResponse> = changes.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(changes)).into_response()
        }
        Err(e) => {
            error!(error = %e, partner_id = %partner_id, "commission history lookup failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}
