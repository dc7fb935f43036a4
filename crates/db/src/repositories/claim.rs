//! Claim repository.
//!
//! Applying a claim's approved deduction onto a booking's deposit is
//! at-most-once: the `applied_at IS NULL` conditional update is the guard,
//! and a second attempt loses the race instead of double-deducting.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use rovia_core::audit::{AuditError, AuditEvent, AuditSeverity};
use rovia_core::deposit::{DepositError, DepositLedger, DepositSnapshot};

use crate::entities::{bookings, claims, sea_orm_active_enums::ClaimStatus};
use crate::repositories::audit::AuditRepository;
use crate::repositories::booking::{BOOKING_RESOURCE, deposit_snapshot};

/// Errors that can occur in claim operations.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Claim not found.
    #[error("Claim not found: {0}")]
    NotFound(Uuid),

    /// Booking not found.
    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    /// The claim is not in the status the operation requires.
    #[error("Claim is {status}, not eligible for this operation")]
    WrongStatus {
        /// The claim status observed.
        status: String,
    },

    /// The deduction was already applied to the deposit.
    #[error("Claim deduction already applied")]
    AlreadyApplied,

    /// The deduction would violate a deposit invariant.
    #[error(transparent)]
    Deposit(#[from] DepositError),

    /// Audit chain failure during recording.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ClaimError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::BookingNotFound(_) => 404,
            Self::WrongStatus { .. } | Self::AlreadyApplied => 409,
            Self::Deposit(e) => e.status_code(),
            Self::Audit(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "CLAIM_NOT_FOUND",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::WrongStatus { .. } => "CLAIM_WRONG_STATUS",
            Self::AlreadyApplied => "CLAIM_ALREADY_APPLIED",
            Self::Deposit(e) => e.error_code(),
            Self::Audit(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Repository for claims against booking deposits.
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    db: DatabaseConnection,
}

impl ClaimRepository {
    /// Creates a new claim repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches a claim by id.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::NotFound` if absent, or `ClaimError::Database`
    /// on storage failure.
    pub async fn find_by_id(&self, claim_id: Uuid) -> Result<claims::Model, ClaimError> {
        claims::Entity::find_by_id(claim_id)
            .one(&self.db)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?
            .ok_or(ClaimError::NotFound(claim_id))
    }

    /// Lists a booking's claims, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::Database` on storage failure.
    pub async fn find_by_booking(&self, booking_id: Uuid) -> Result<Vec<claims::Model>, ClaimError> {
        claims::Entity::find()
            .filter(claims::Column::BookingId.eq(booking_id))
            .order_by_desc(claims::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))
    }

    /// Records the adjudicated deduction on a filed claim.
    ///
    /// The deduction is bounded by the booking's remaining net deposit; it
    /// does not touch the deposit until [`Self::deduct_for_claim`] runs.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::WrongStatus` unless the claim is `filed`,
    /// `ClaimError::Deposit` if the deduction exceeds the remaining
    /// deposit, or `ClaimError::Database` on storage failure.
    pub async fn approve(
        &self,
        claim_id: Uuid,
        approved_deduction: Decimal,
    ) -> Result<claims::Model, ClaimError> {
        if approved_deduction < Decimal::ZERO {
            return Err(ClaimError::Deposit(DepositError::NegativeAmount(
                approved_deduction,
            )));
        }

        let claim = self.find_by_id(claim_id).await?;
        if claim.status != ClaimStatus::Filed {
            return Err(ClaimError::WrongStatus {
                status: format!("{:?}", claim.status).to_lowercase(),
            });
        }

        let booking = self.booking(claim.booking_id).await?;
        let snapshot = deposit_snapshot(&booking);
        let remaining = snapshot.net_deposit();
        if approved_deduction > remaining {
            return Err(ClaimError::Deposit(DepositError::ClaimExceedsDeposit {
                claim: approved_deduction,
                deposit: remaining,
            }));
        }

        let mut active: claims::ActiveModel = claim.into();
        active.status = Set(ClaimStatus::Approved);
        active.approved_deduction = Set(approved_deduction);
        active.updated_at = Set(Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))
    }

    /// Applies an approved claim's deduction onto the booking deposit.
    ///
    /// At most once per claim: the conditional update on `applied_at IS
    /// NULL` guards against concurrent and repeat calls. The deposit
    /// mutation, the guard flip, and the audit entry commit together.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::AlreadyApplied` on a repeat attempt,
    /// `ClaimError::WrongStatus` unless the claim is `approved`,
    /// `ClaimError::Deposit` if the post-application figures would violate
    /// an invariant, or `ClaimError::Database` on storage failure.
    pub async fn deduct_for_claim(
        &self,
        booking_id: Uuid,
        claim_id: Uuid,
    ) -> Result<bookings::Model, ClaimError> {
        let claim = self.find_by_id(claim_id).await?;
        if claim.booking_id != booking_id {
            return Err(ClaimError::NotFound(claim_id));
        }
        match claim.status {
            ClaimStatus::Approved => {}
            ClaimStatus::Filed | ClaimStatus::Withdrawn => {
                return Err(ClaimError::WrongStatus {
                    status: format!("{:?}", claim.status).to_lowercase(),
                });
            }
        }
        if claim.applied_at.is_some() {
            return Err(ClaimError::AlreadyApplied);
        }

        let booking = self.booking(booking_id).await?;
        let snapshot = deposit_snapshot(&booking);
        let new_used = snapshot.deposit_used_for_claim + claim.approved_deduction;
        DepositLedger::validate(&DepositSnapshot {
            deposit_used_for_claim: new_used,
            ..snapshot
        })?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        let now = Utc::now();
        let guarded = claims::Entity::update_many()
            .col_expr(claims::Column::AppliedAt, Expr::value(now))
            .col_expr(claims::Column::UpdatedAt, Expr::value(now))
            .filter(claims::Column::Id.eq(claim_id))
            .filter(claims::Column::AppliedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;
        if guarded.rows_affected == 0 {
            return Err(ClaimError::AlreadyApplied);
        }

        let mut active: bookings::ActiveModel = booking.into();
        active.deposit_used_for_claim = Set(new_used);
        active.updated_at = Set(now.into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        AuditRepository::append(
            &txn,
            BOOKING_RESOURCE,
            booking_id,
            &AuditEvent {
                category: "claim".to_string(),
                event_type: "claim_deduction_applied".to_string(),
                severity: AuditSeverity::Info,
                action: "Approved claim deduction applied to deposit".to_string(),
                amount: Some(claim.approved_deduction),
                metadata: json!({
                    "claim_id": claim_id,
                    "deposit_used_for_claim": new_used,
                }),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Withdraws a filed claim before adjudication.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::WrongStatus` unless the claim is `filed`, or
    /// `ClaimError::Database` on storage failure.
    pub async fn withdraw(&self, claim_id: Uuid) -> Result<claims::Model, ClaimError> {
        let claim = self.find_by_id(claim_id).await?;
        if claim.status != ClaimStatus::Filed {
            return Err(ClaimError::WrongStatus {
                status: format!("{:?}", claim.status).to_lowercase(),
            });
        }

        let mut active: claims::ActiveModel = claim.into();
        active.status = Set(ClaimStatus::Withdrawn);
        active.updated_at = Set(Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))
    }

    async fn booking(&self, booking_id: Uuid) -> Result<bookings::Model, ClaimError> {
        bookings::Entity::find_by_id(booking_id)
            .one(&self.db)
            .await
            .map_err(|e| ClaimError::Database(e.to_string()))?
            .ok_or(ClaimError::BookingNotFound(booking_id))
    }
}
