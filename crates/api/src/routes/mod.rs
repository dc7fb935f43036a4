//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::job_auth_middleware};

pub mod audit;
pub mod claims;
pub mod health;
pub mod jobs;
pub mod partners;
pub mod settlements;
pub mod wallets;

/// Creates the public API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(settlements::routes())
        .merge(claims::routes())
        .merge(wallets::routes())
        .merge(partners::routes())
        .merge(audit::routes())
}

/// Creates the scheduler-triggered job router, guarded by the shared secret.
#[allow(clippy::needless_pass_by_value)]
pub fn job_routes(state: AppState) -> Router<AppState> {
    jobs::routes().layer(middleware::from_fn_with_state(state, job_auth_middleware))
}

/// Builds the standard error body from an error's status and code.
pub(crate) fn error_response(status: u16, code: &str, message: &str) -> Response {
    let status =
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": code, "message": message })),
    )
        .into_response()
}
