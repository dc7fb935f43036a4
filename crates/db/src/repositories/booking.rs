//! Booking repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::Expr,
};
use serde_json::json;
use uuid::Uuid;

use rovia_core::audit::{AuditEvent, AuditSeverity};
use rovia_core::deposit::{DepositLedger, DepositSnapshot};
use rovia_core::settlement::SettlementError;

use crate::entities::{
    bookings,
    sea_orm_active_enums::{BookingStatus, HostReviewStatus, SettlementState, TripStatus},
};
use crate::repositories::audit::AuditRepository;

/// Audit scope name for booking events.
pub const BOOKING_RESOURCE: &str = "booking";

/// Input for creating a booking with its deposit split.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Guest taking the trip.
    pub guest_id: Uuid,
    /// Host owning the vehicle.
    pub host_id: Uuid,
    /// Vehicle being rented.
    pub vehicle_id: Uuid,
    /// Total deposit taken at booking time.
    pub deposit_amount: Decimal,
    /// Portion funded from the guest's wallet.
    pub deposit_from_wallet: Decimal,
    /// Portion funded from a card authorization.
    pub deposit_from_card: Decimal,
    /// Scheduled end of the trip window.
    pub end_date: DateTime<Utc>,
    /// Hold deadline, when the booking starts on hold.
    pub hold_deadline: Option<DateTime<Utc>>,
    /// Why the booking is on hold, if it is.
    pub hold_reason: Option<String>,
}

/// Repository for booking rows.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    db: DatabaseConnection,
}

impl BookingRepository {
    /// Creates a new booking repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a booking after validating its deposit funding split.
    ///
    /// A booking with a hold deadline starts `on_hold`; otherwise `active`.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::Deposit` if the split does not sum to the
    /// deposit amount or a figure is negative, or `SettlementError::Database`
    /// on storage failure.
    pub async fn create(&self, input: NewBooking) -> Result<bookings::Model, SettlementError> {
        DepositLedger::validate(&DepositSnapshot {
            deposit_amount: input.deposit_amount,
            deposit_from_wallet: input.deposit_from_wallet,
            deposit_from_card: input.deposit_from_card,
            deposit_used_for_claim: Decimal::ZERO,
        })?;

        let status = if input.hold_deadline.is_some() {
            BookingStatus::OnHold
        } else {
            BookingStatus::Active
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        let now = Utc::now().into();
        let booking = bookings::ActiveModel {
            id: Set(Uuid::new_v4()),
            guest_id: Set(input.guest_id),
            host_id: Set(input.host_id),
            vehicle_id: Set(input.vehicle_id),
            status: Set(status),
            trip_status: Set(TripStatus::Scheduled),
            host_review_status: Set(HostReviewStatus::PendingReview),
            settlement_state: Set(SettlementState::Pending),
            deposit_amount: Set(input.deposit_amount),
            deposit_from_wallet: Set(input.deposit_from_wallet),
            deposit_from_card: Set(input.deposit_from_card),
            deposit_used_for_claim: Set(Decimal::ZERO),
            deposit_refunded: Set(Decimal::ZERO),
            hold_deadline: Set(input.hold_deadline.map(Into::into)),
            hold_reason: Set(input.hold_reason),
            end_date: Set(input.end_date.into()),
            trip_ended_at: Set(None),
            cancellation_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| SettlementError::Database(e.to_string()))?;

        AuditRepository::append(
            &txn,
            BOOKING_RESOURCE,
            booking.id,
            &AuditEvent {
                category: "booking".to_string(),
                event_type: "booking_created".to_string(),
                severity: AuditSeverity::Info,
                action: "Booking created with deposit".to_string(),
                amount: Some(booking.deposit_amount),
                metadata: json!({
                    "guest_id": booking.guest_id,
                    "vehicle_id": booking.vehicle_id,
                    "deposit_from_wallet": booking.deposit_from_wallet,
                    "deposit_from_card": booking.deposit_from_card,
                }),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        Ok(booking)
    }

    /// Fetches a booking by id.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::BookingNotFound` if absent, or
    /// `SettlementError::Database` on storage failure.
    pub async fn find_by_id(&self, booking_id: Uuid) -> Result<bookings::Model, SettlementError> {
        bookings::Entity::find_by_id(booking_id)
            .one(&self.db)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?
            .ok_or(SettlementError::BookingNotFound(booking_id))
    }

    /// Marks a trip as ended, moving the booking into host review.
    ///
    /// Conditional on the booking still being `active`; a lost race is a
    /// `PreconditionFailed`.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::PreconditionFailed` if the booking is no
    /// longer active, or `SettlementError::Database` on storage failure.
    pub async fn complete_trip(&self, booking_id: Uuid) -> Result<bookings::Model, SettlementError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        let now = Utc::now();
        let result = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, BookingStatus::Completed.as_enum())
            .col_expr(bookings::Column::TripStatus, TripStatus::Completed.as_enum())
            .col_expr(bookings::Column::TripEndedAt, Expr::value(now))
            .col_expr(bookings::Column::UpdatedAt, Expr::value(now))
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Active))
            .exec(&txn)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(SettlementError::PreconditionFailed);
        }

        AuditRepository::append(
            &txn,
            BOOKING_RESOURCE,
            booking_id,
            &AuditEvent {
                category: "booking".to_string(),
                event_type: "trip_completed".to_string(),
                severity: AuditSeverity::Info,
                action: "Trip ended; awaiting host review".to_string(),
                amount: None,
                metadata: json!({}),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        self.find_by_id(booking_id).await
    }
}

/// Reads the pure deposit snapshot out of a stored booking.
#[must_use]
pub fn deposit_snapshot(booking: &bookings::Model) -> DepositSnapshot {
    DepositSnapshot {
        deposit_amount: booking.deposit_amount,
        deposit_from_wallet: booking.deposit_from_wallet,
        deposit_from_card: booking.deposit_from_card,
        deposit_used_for_claim: booking.deposit_used_for_claim,
    }
}
