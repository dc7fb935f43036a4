//! Hold expiry sweep.
//!
//! Each expirable booking is forfeited in its own transaction with a
//! conditional update, so a guest resolving the hold mid-sweep wins the
//! race and the sweep just skips that booking.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveEnum, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait, sea_query::Expr,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use rovia_core::audit::{AuditEvent, AuditSeverity};
use rovia_core::hold::{HoldError, HoldExpiry, HoldSnapshot, expiry::FORFEITURE_REASON};

use crate::entities::{
    bookings,
    sea_orm_active_enums::{BookingStatus, TripStatus},
};
use crate::repositories::audit::AuditRepository;
use crate::repositories::booking::BOOKING_RESOURCE;

/// Result of one hold expiry sweep.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Bookings that matched the expiry predicate.
    pub examined: usize,
    /// Bookings forfeited in this sweep.
    pub expired: Vec<Uuid>,
    /// Bookings skipped because the precondition was lost mid-sweep.
    pub skipped: Vec<Uuid>,
    /// True if this was a preview run (no mutations).
    pub preview: bool,
}

/// Scans for and forfeits expired provisional holds.
#[derive(Debug, Clone)]
pub struct HoldSweepService {
    db: DatabaseConnection,
}

impl HoldSweepService {
    /// Creates a new hold sweep service.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs one sweep as of `now`.
    ///
    /// `preview = true` reports the matching bookings without mutating
    /// anything. A live run forfeits each booking to `no_show` with a
    /// conditional update and an audit entry in the same transaction; no
    /// refund is issued.
    ///
    /// # Errors
    ///
    /// Returns `HoldError::Database` on storage failure.
    pub async fn run(&self, now: DateTime<Utc>, preview: bool) -> Result<SweepReport, HoldError> {
        let candidates = self.expirable(now).await?;

        if preview {
            return Ok(SweepReport {
                examined: candidates.len(),
                expired: candidates.iter().map(|b| b.id).collect(),
                skipped: Vec::new(),
                preview: true,
            });
        }

        let mut expired = Vec::new();
        let mut skipped = Vec::new();
        for booking in &candidates {
            if self.forfeit(booking, now).await? {
                expired.push(booking.id);
            } else {
                skipped.push(booking.id);
            }
        }

        info!(
            examined = candidates.len(),
            expired = expired.len(),
            skipped = skipped.len(),
            "hold expiry sweep finished"
        );

        Ok(SweepReport {
            examined: candidates.len(),
            expired,
            skipped,
            preview: false,
        })
    }

    /// Lists on-hold bookings whose deadline falls within the window.
    ///
    /// Read-only; used for best-effort reminder notifications.
    ///
    /// # Errors
    ///
    /// Returns `HoldError::Database` on storage failure.
    pub async fn upcoming_deadlines(
        &self,
        now: DateTime<Utc>,
        window_hours: i64,
    ) -> Result<Vec<bookings::Model>, HoldError> {
        let until = now + Duration::hours(window_hours);
        bookings::Entity::find()
            .filter(bookings::Column::Status.eq(BookingStatus::OnHold))
            .filter(bookings::Column::HoldDeadline.gt(now))
            .filter(bookings::Column::HoldDeadline.lte(until))
            .order_by_asc(bookings::Column::HoldDeadline)
            .all(&self.db)
            .await
            .map_err(|e| HoldError::Database(e.to_string()))
    }

    async fn expirable(&self, now: DateTime<Utc>) -> Result<Vec<bookings::Model>, HoldError> {
        // The SQL predicate mirrors the pure rule; the pure rule is still
        // re-checked per booking before the conditional update.
        bookings::Entity::find()
            .filter(bookings::Column::Status.eq(BookingStatus::OnHold))
            .filter(bookings::Column::HoldDeadline.is_not_null())
            .filter(bookings::Column::HoldDeadline.lt(now))
            .filter(bookings::Column::EndDate.lt(now))
            .all(&self.db)
            .await
            .map_err(|e| HoldError::Database(e.to_string()))
    }

    /// Forfeits one booking; returns false if the precondition was lost.
    async fn forfeit(&self, booking: &bookings::Model, now: DateTime<Utc>) -> Result<bool, HoldError> {
        let snapshot = HoldSnapshot {
            status: booking.status.clone().into(),
            hold_deadline: booking.hold_deadline.map(|d| d.with_timezone(&Utc)),
            end_date: booking.end_date.with_timezone(&Utc),
        };
        let action = match HoldExpiry::expire(&snapshot, now) {
            Ok(action) => action,
            Err(HoldError::NotExpirable { .. } | HoldError::NoDeadline) => {
                warn!(booking_id = %booking.id, "booking no longer expirable; skipping");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HoldError::Database(e.to_string()))?;

        let result = bookings::Entity::update_many()
            .col_expr(
                bookings::Column::Status,
                BookingStatus::from(action.new_status).as_enum(),
            )
            .col_expr(
                bookings::Column::TripStatus,
                TripStatus::from(action.new_trip_status).as_enum(),
            )
            .col_expr(
                bookings::Column::CancellationReason,
                Expr::value(Some(action.cancellation_reason.clone())),
            )
            .col_expr(bookings::Column::HoldDeadline, Expr::value(Option::<DateTime<Utc>>::None))
            .col_expr(bookings::Column::HoldReason, Expr::value(Option::<String>::None))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(now))
            .filter(bookings::Column::Id.eq(booking.id))
            .filter(bookings::Column::Status.eq(BookingStatus::OnHold))
            .exec(&txn)
            .await
            .map_err(|e| HoldError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            // A concurrent resolution won; leave the booking alone.
            return Ok(false);
        }

        AuditRepository::append(
            &txn,
            BOOKING_RESOURCE,
            booking.id,
            &AuditEvent {
                category: "hold".to_string(),
                event_type: "deposit_forfeited".to_string(),
                severity: AuditSeverity::Warning,
                action: FORFEITURE_REASON.to_string(),
                amount: Some(booking.deposit_amount),
                metadata: json!({
                    "guest_id": booking.guest_id,
                    "hold_deadline": booking.hold_deadline,
                    "end_date": booking.end_date,
                }),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| HoldError::Database(e.to_string()))?;

        info!(booking_id = %booking.id, "hold expired; deposit forfeited");
        Ok(true)
    }
}
