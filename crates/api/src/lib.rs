//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Scheduler shared-secret middleware
//! - HTTP clients for the payment processor and notification service

pub mod clients;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rovia_core::external::Notifier;
use rovia_db::SettlementService;
use rovia_shared::config::JobsConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Settlement execution service.
    pub settlement: Arc<SettlementService>,
    /// Notification service for best-effort reminders.
    pub notifier: Arc<dyn Notifier>,
    /// Scheduled job configuration (shared secret, reminder window).
    pub jobs: Arc<JobsConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .nest("/internal/jobs", routes::job_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use rovia_core::external::notifier::{Notification, NotifyError};
    use rovia_core::external::processor::{PaymentProcessor, ProcessorError, RefundRecord};
    use rovia_shared::config::JobsConfig;

    struct NoopProcessor;

    #[async_trait]
    impl PaymentProcessor for NoopProcessor {
        async fn release(
            &self,
            _booking_id: Uuid,
            _amount_minor: i64,
        ) -> Result<RefundRecord, ProcessorError> {
            Err(ProcessorError::Transport("not wired in tests".to_string()))
        }
    }

    struct NoopNotifier;

    #[async_trait]
    impl rovia_core::external::Notifier for NoopNotifier {
        async fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn test_state() -> AppState {
        let db = sea_orm::DatabaseConnection::default();
        let settlement = rovia_db::SettlementService::new(
            db.clone(),
            Arc::new(NoopProcessor),
            Arc::new(NoopNotifier),
        );
        AppState {
            db: Arc::new(db),
            settlement: Arc::new(settlement),
            notifier: Arc::new(NoopNotifier),
            jobs: Arc::new(JobsConfig {
                token: "test-job-token".to_string(),
                reminder_window_hours: 24,
            }),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint_responds() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_job_route_requires_token() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/internal/jobs/hold-expiry")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_job_route_rejects_wrong_token() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/internal/jobs/hold-expiry")
                    .header("X-Job-Token", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
