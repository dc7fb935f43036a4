//! Shared-secret middleware for the internal scheduler endpoints.
//!
//! The external scheduler authenticates with an `X-Job-Token` header. The
//! secret comes from configuration only; startup fails before this code runs
//! if it is absent.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::AppState;

/// Header carrying the scheduler's shared secret.
pub const JOB_TOKEN_HEADER: &str = "x-job-token";

/// Validates the `X-Job-Token` header against the configured secret.
pub async fn job_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(JOB_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|token| token_matches(token, &state.jobs.token));

    if authorized {
        next.run(request).await
    } else {
        warn!(path = %request.uri().path(), "job trigger rejected: bad or missing token");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_job_token",
                "message": "A valid X-Job-Token header is required"
            })),
        )
            .into_response()
    }
}

/// Compares fixed-size digests instead of the strings themselves, so the
/// comparison time does not depend on how long a matching prefix is.
fn token_matches(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("s3cret", true)]
    #[case("s3cret ", false)]
    #[case("s3cre", false)]
    #[case("s3cretx", false)]
    #[case("", false)]
    fn test_token_matches_exact_only(#[case] provided: &str, #[case] expected: bool) {
        assert_eq!(token_matches(provided, "s3cret"), expected);
    }
}
