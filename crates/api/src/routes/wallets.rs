//! Guest wallet routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, routes::error_response};
use rovia_db::WalletRepository;
use rovia_db::entities::{sea_orm_active_enums::WalletEntryType, wallet_transactions};

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/guests/{guest_id}/wallet", get(get_wallet))
}

/// A single wallet ledger entry.
#[derive(Debug, Serialize)]
pub struct WalletEntryResponse {
    /// Entry id.
    pub id: Uuid,
    /// Booking the entry relates to, if any.
    pub booking_id: Option<Uuid>,
    /// Entry type.
    pub entry_type: WalletEntryType,
    /// Signed-by-type amount (always positive; type carries direction).
    pub amount: Decimal,
    /// Balance after this entry was applied.
    pub balance_after: Decimal,
    /// Human-readable reason.
    pub reason: String,
    /// When the entry was recorded.
    pub created_at: DateTime<FixedOffset>,
}

impl From<wallet_transactions::Model> for WalletEntryResponse {
    fn from(model: wallet_transactions::Model) -> Self {
        Self {
            id: model.id,
            booking_id: model.booking_id,
            entry_type: model.entry_type,
            amount: model.amount,
            balance_after: model.balance_after,
            reason: model.reason,
            created_at: model.created_at,
        }
    }
}

/// Response for a guest's wallet.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// The guest the wallet belongs to.
    pub guest_id: Uuid,
    /// Current balance. Zero when no account exists yet.
    pub balance: Decimal,
    /// Ledger entries, newest first.
    pub transactions: Vec<WalletEntryResponse>,
}

/// GET /guests/{guest_id}/wallet - Balance plus transaction history.
///
/// A guest with no wallet activity yet gets a zero balance, not a 404;
/// accounts are created lazily on the first credit.
async fn get_wallet(
    State(state): State<AppState>,
    Path(guest_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    let balance = match repo.account(guest_id).await {
        Ok(account) => account.map_or(Decimal::ZERO, |a| a.balance),
        Err(e) => {
            error!(error = %e, guest_id = %guest_id, "wallet lookup failed");
            return error_response(e.status_code(), e.error_code(), &e.to_string());
        }
    };

    match repo.history(guest_id).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(WalletResponse {
                guest_id,
                balance,
                transactions: entries.into_iter().map(Into::into).collect(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, guest_id = %guest_id, "wallet history lookup failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}
