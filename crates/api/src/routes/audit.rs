//! Audit chain routes for compliance tooling.

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
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, routes::error_response};
use rovia_core::audit::ChainReport;
use rovia_db::AuditRepository;
use rovia_db::entities::{audit_log, sea_orm_active_enums::AuditSeverity};

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit/{resource}/{resource_id}", get(list_entries))
        .route("/audit/{resource}/{resource_id}/verify", post(verify_chain))
}

/// One audit chain entry.
#[derive(Debug, Serialize)]
pub struct AuditEntryResponse {
    /// Position within the scope, starting at 1.
    pub seq: i64,
    /// Event category.
    pub category: String,
    /// Machine-readable event type.
    pub event_type: String,
    /// Severity level.
    pub severity: AuditSeverity,
    /// Human-readable action description.
    pub action: String,
    /// Monetary amount, when the event moved money.
    pub amount: Option<Decimal>,
    /// Structured event data.
    pub metadata: serde_json::Value,
    /// This entry's hash.
    pub hash: String,
    /// Previous entry's hash; null for the scope's first entry.
    pub previous_hash: Option<String>,
    /// When the entry was recorded.
    pub recorded_at: DateTime<FixedOffset>,
}

impl From<audit_log::Model> for AuditEntryResponse {
    fn from(model: audit_log::Model) -> Self {
        Self {
            seq: model.seq,
            category: model.category,
            event_type: model.event_type,
            severity: model.severity,
            action: model.action,
            amount: model.amount,
            metadata: model.metadata,
            hash: model.hash,
            previous_hash: model.previous_hash,
            recorded_at: model.created_at,
        }
    }
}

/// GET /audit/{resource}/{resource_id} - A scope's chain, in order.
///
/// Includes the recorded fault when the scope is halted, so compliance
/// tooling sees both the entries and why writes stopped.
async fn list_entries(
    State(state): State<AppState>,
    Path((resource, resource_id)): Path<(String, Uuid)>,
) -> impl IntoResponse {
    let repo = AuditRepository::new((*state.db).clone());

    let fault = match repo.fault(&resource, resource_id).await {
        Ok(fault) => fault,
        Err(e) => {
            error!(error = %e, resource, %resource_id, "audit fault lookup failed");
            return error_response(e.status_code(), e.error_code(), &e.to_string());
        }
    };

    match repo.entries(&resource, resource_id).await {
        Ok(entries) => {
            let entries: Vec<AuditEntryResponse> = entries.into_iter().map(Into::into).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "resource": resource,
                    "resource_id": resource_id,
                    "halted": fault.is_some(),
                    "fault": fault.map(|f| json!({
                        "first_bad_seq": f.first_bad_seq,
                        "detail": f.detail,
                        "detected_at": f.detected_at,
                    })),
                    "entries": entries,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, resource, %resource_id, "audit entries lookup failed");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// POST /audit/{resource}/{resource_id}/verify - Recompute and check hashes.
///
/// A broken chain is reported with 200: the verification itself succeeded,
/// and the scope is now halted for writes.
async fn verify_chain(
    State(state): State<AppState>,
    Path((resource, resource_id)): Path<(String, Uuid)>,
) -> impl IntoResponse {
    let repo = AuditRepository::new((*state.db).clone());

    match repo.verify_chain(&resource, resource_id).await {
        Ok(ChainReport::Valid { entries }) => (
            StatusCode::OK,
            Json(json!({
                "resource": resource,
                "resource_id": resource_id,
                "valid": true,
                "entries": entries,
            })),
        )
            .into_response(),
        Ok(ChainReport::Broken {
            first_bad_seq,
            detail,
        }) => (
            StatusCode::OK,
            Json(json!({
                "resource": resource,
                "resource_id": resource_id,
                "valid": false,
                "first_bad_seq": first_bad_seq,
                "detail": detail,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, resource, %resource_id, "audit chain verification errored");
            error_response(e.status_code(), e.error_code(), &e.to_string())
        }
    }
}
