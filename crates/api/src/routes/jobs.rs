//! Scheduler-triggered job routes.
//!
//! The platform's external scheduler POSTs here on a fixed cadence. The
//! shared-secret middleware is applied by the caller; nothing in this module
//! is reachable without it.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{AppState, routes::error_response};
use rovia_core::external::Notification;
use rovia_db::{BookingRepository, HoldSweepService};

/// Creates the job routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/hold-expiry", post(run_hold_expiry))
}

/// Query parameters for the hold-expiry trigger.
#[derive(Debug, Deserialize)]
pub struct HoldExpiryQuery {
    /// When true, report what would be forfeited without mutating.
    #[serde(default)]
    pub preview: bool,
}

/// Response for a hold-expiry run.
#[derive(Debug, Serialize)]
pub struct HoldExpiryResponse {
    /// Bookings matched by the expiry predicate.
    pub examined: usize,
    /// Bookings forfeited (or, in preview, that would be).
    pub expired: Vec<Uuid>,
    /// Bookings skipped because the precondition was lost mid-sweep.
    pub skipped: Vec<Uuid>,
    /// Whether this was a dry run.
    pub preview: bool,
    /// Reminder notifications attempted for upcoming deadlines.
    pub reminders_sent: usize,
}

/// POST /hold-expiry - Sweep expired holds; remind upcoming ones.
async fn run_hold_expiry(
    State(state): State<AppState>,
    Query(query): Query<HoldExpiryQuery>,
) -> impl IntoResponse {
    let now = Utc::now();
    let sweep = HoldSweepService::new((*state.db).clone());

    let report = match sweep.run(now, query.preview).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "hold expiry sweep failed");
            return error_response(e.status_code(), e.error_code(), &e.to_string());
        }
    };

    info!(
        examined = report.examined,
        expired = report.expired.len(),
        skipped = report.skipped.len(),
        preview = report.preview,
        "hold expiry sweep finished"
    );

    let mut reminders_sent = 0;
    if !query.preview {
        notify_forfeited(&state, &report.expired).await;
        reminders_sent = send_reminders(&state, now).await;
    }

    (
        StatusCode::OK,
        Json(HoldExpiryResponse {
            examined: report.examined,
            expired: report.expired,
            skipped: report.skipped,
            preview: report.preview,
            reminders_sent,
        }),
    )
        .into_response()
}

/// Tells both sides of each forfeited booking what happened. Failures are
/// logged only.
async fn notify_forfeited(state: &AppState, booking_ids: &[Uuid]) {
    let repo = BookingRepository::new((*state.db).clone());
    for &booking_id in booking_ids {
        let booking = match repo.find_by_id(booking_id).await {
            Ok(booking) => booking,
            Err(e) => {
                warn!(error = %e, %booking_id, "skipping forfeiture notice; booking reload failed");
                continue;
            }
        };
        for recipient in [booking.guest_id, booking.host_id] {
            let notification = Notification {
                recipient,
                template: "deposit_forfeited".to_string(),
                data: json!({
                    "booking_id": booking_id,
                    "deposit_amount": booking.deposit_amount,
                }),
            };
            if let Err(e) = state.notifier.notify(notification).await {
                warn!(error = %e, %booking_id, "forfeiture notice delivery failed");
            }
        }
    }
}

/// Reminds guests whose hold deadline falls inside the configured window.
async fn send_reminders(state: &AppState, now: chrono::DateTime<Utc>) -> usize {
    let sweep = HoldSweepService::new((*state.db).clone());
    let window = i64::from(state.jobs.reminder_window_hours);

    let upcoming = match sweep.upcoming_deadlines(now, window).await {
        Ok(upcoming) => upcoming,
        Err(e) => {
            warn!(error = %e, "reminder scan failed; continuing without reminders");
            return 0;
        }
    };

    let mut sent = 0;
    for booking in upcoming {
        let notification = Notification {
            recipient: booking.guest_id,
            template: "hold_deadline_reminder".to_string(),
            data: json!({
                "booking_id": booking.id,
                "hold_deadline": booking.hold_deadline,
                "hold_reason": booking.hold_reason,
            }),
        };
        match state.notifier.notify(notification).await {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!(error = %e, booking_id = %booking.id, "reminder delivery failed");
            }
        }
    }
    sent
}
