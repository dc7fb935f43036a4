//! Settlement service: executes the deposit release exactly once.
//!
//! The ordering invariant is the whole design: the review transition is
//! committed durably (transaction 1) before the payment processor is
//! called, and the processor's confirmation is recorded afterwards
//! (transaction 2). A crash between the two leaves an `approved` booking
//! with `settlement_state = pending`, which reconciliation picks up; at no
//! point can money move for a booking whose approval was never recorded.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use rovia_core::audit::{AuditEvent, AuditSeverity};
use rovia_core::deposit::{DepositLedger, NetRelease};
use rovia_core::external::notifier::{Notification, Notifier};
use rovia_core::external::processor::{
    PaymentProcessor, RefundRecord, release_idempotency_key,
};
use rovia_core::settlement::{
    HostReviewStatus as CoreReviewStatus, ReviewDecision, SettlementError, SettlementReview,
    SettlementState as CoreSettlementState,
};
use rovia_shared::types::to_minor_units;

use crate::entities::{
    bookings, claims,
    sea_orm_active_enums::{BookingStatus, ClaimStatus, HostReviewStatus, SettlementState},
};
use crate::repositories::audit::AuditRepository;
use crate::repositories::booking::{BOOKING_RESOURCE, deposit_snapshot};
use crate::repositories::wallet::{WalletError, WalletRepository};
use crate::entities::sea_orm_active_enums::WalletEntryType;

/// Outcome of a settlement operation.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    /// The booking after the operation.
    pub booking: bookings::Model,
    /// How the released amount split across funding sources.
    pub net_release: NetRelease,
    /// Money-movement state after the operation.
    pub settlement_state: CoreSettlementState,
    /// Processor confirmation for the card portion, if one was obtained.
    pub refund: Option<RefundRecord>,
    /// True once every releasable portion has been recorded.
    pub release_complete: bool,
    /// True when the call observed an already-recorded decision and
    /// performed no side effects.
    pub already_decided: bool,
}

/// Executes host review decisions against bookings.
#[derive(Clone)]
pub struct SettlementService {
    db: DatabaseConnection,
    processor: Arc<dyn PaymentProcessor>,
    notifier: Arc<dyn Notifier>,
}

impl SettlementService {
    /// Creates a new settlement service.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        processor: Arc<dyn PaymentProcessor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            processor,
            notifier,
        }
    }

    /// Records the host's approval and releases the net deposit.
    ///
    /// Steps: commit the review transition; call the processor for the
    /// card portion (idempotency-keyed per booking); credit the wallet
    /// portion; record `deposit_refunded` as the total net release. A
    /// processor failure leaves the booking `approved` with
    /// `settlement_state = reconciliation_required` and succeeds with
    /// `release_complete = false`; it is never rolled back or retried here.
    ///
    /// A repeat call observes the recorded decision and returns it with
    /// `already_decided = true` and no side effects.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::NotEligible` for a booking outside the
    /// settleable state, `AlreadyDecided` when a claim was already filed,
    /// `PreconditionFailed` on a lost commit race, or `Database`/`Deposit`
    /// errors from storage and ledger validation.
    pub async fn approve(&self, booking_id: Uuid) -> Result<SettlementOutcome, SettlementError> {
        let booking = self.find_booking(booking_id).await?;

        let action = match SettlementReview::approve(
            booking.status.clone().into(),
            booking.host_review_status.clone().into(),
        ) {
            Ok(action) => action,
            Err(SettlementError::AlreadyDecided {
                review_status: CoreReviewStatus::Approved,
            }) => {
                // Double click or scheduler race: report the recorded
                // outcome without moving money again.
                return Ok(Self::decided_outcome(booking));
            }
            Err(e) => return Err(e),
        };
        debug_assert_eq!(action.decision, ReviewDecision::Approve);

        let net_release = DepositLedger::net_release(&deposit_snapshot(&booking))?;

        // Transaction 1: the review decision becomes durable before any
        // external call can observe it.
        self.commit_decision(&booking, HostReviewStatus::Approved, BookingStatus::Approved)
            .await?;
        self.audit_standalone(
            booking_id,
            &AuditEvent {
                category: "settlement".to_string(),
                event_type: "release_approved".to_string(),
                severity: AuditSeverity::Info,
                action: "Host approved deposit release".to_string(),
                amount: Some(net_release.total()),
                metadata: json!({
                    "wallet_portion": net_release.wallet_portion,
                    "card_portion": net_release.card_portion,
                }),
            },
        )
        .await?;

        // Card portion goes through the processor; the confirmation is the
        // only source of truth for it.
        let refund = if net_release.card_portion > Decimal::ZERO {
            let minor = to_minor_units(net_release.card_portion)
                .map_err(|e| SettlementError::Amount(e.to_string()))?;
            match self.processor.release(booking_id, minor).await {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        %booking_id,
                        error = %e,
                        "processor release failed; flagging for reconciliation"
                    );
                    return self.flag_reconciliation(booking_id, net_release, &e).await;
                }
            }
        } else {
            None
        };

        // Transaction 2: wallet credit, refund bookkeeping, and the
        // summary audit entry commit together.
        let booking = self
            .record_release(booking_id, net_release, refund.as_ref())
            .await?;

        self.notify_parties(
            &booking,
            "deposit_released",
            json!({
                "booking_id": booking_id,
                "wallet_portion": net_release.wallet_portion,
                "card_portion": net_release.card_portion,
            }),
        )
        .await;

        Ok(SettlementOutcome {
            booking,
            net_release,
            settlement_state: CoreSettlementState::Settled,
            refund,
            release_complete: true,
            already_decided: false,
        })
    }

    /// Records the host filing a claim; the deposit stays held.
    ///
    /// A repeat call observes the recorded claim decision and returns it
    /// with `already_decided = true`.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::AlreadyDecided` when the release was
    /// already approved, `NotEligible` outside the settleable state,
    /// `PreconditionFailed` on a lost race, or `Database` errors.
    pub async fn file_claim(&self, booking_id: Uuid) -> Result<SettlementOutcome, SettlementError> {
        let booking = self.find_booking(booking_id).await?;

        match SettlementReview::file_claim(
            booking.status.clone().into(),
            booking.host_review_status.clone().into(),
        ) {
            Ok(_) => {}
            Err(SettlementError::AlreadyDecided {
                review_status: CoreReviewStatus::ClaimFiled,
            }) => {
                return Ok(Self::decided_outcome(booking));
            }
            Err(e) => return Err(e),
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        let now = Utc::now();
        let result = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, BookingStatus::ClaimFiled.as_enum())
            .col_expr(
                bookings::Column::HostReviewStatus,
                HostReviewStatus::ClaimFiled.as_enum(),
            )
            .col_expr(bookings::Column::UpdatedAt, Expr::value(now))
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::Status.eq(BookingStatus::Completed))
            .filter(bookings::Column::HostReviewStatus.eq(HostReviewStatus::PendingReview))
            .exec(&txn)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;
        if result.rows_affected == 0 {
            return Err(SettlementError::PreconditionFailed);
        }

        let claim = claims::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            status: Set(ClaimStatus::Filed),
            approved_deduction: Set(Decimal::ZERO),
            applied_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| SettlementError::Database(e.to_string()))?;

        AuditRepository::append(
            &txn,
            BOOKING_RESOURCE,
            booking_id,
            &AuditEvent {
                category: "settlement".to_string(),
                event_type: "claim_filed".to_string(),
                severity: AuditSeverity::Info,
                action: "Host filed a claim; deposit held".to_string(),
                amount: Some(booking.deposit_amount),
                metadata: json!({ "claim_id": claim.id }),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        info!(%booking_id, claim_id = %claim.id, "claim filed; deposit held");

        self.notify_best_effort(
            booking.guest_id,
            "claim_filed",
            json!({ "booking_id": booking_id, "claim_id": claim.id }),
        )
        .await;

        let booking = self.find_booking(booking_id).await?;
        let net_release = NetRelease {
            wallet_portion: Decimal::ZERO,
            card_portion: Decimal::ZERO,
        };
        Ok(SettlementOutcome {
            booking,
            net_release,
            settlement_state: CoreSettlementState::Pending,
            refund: None,
            release_complete: false,
            already_decided: false,
        })
    }

    /// Releases the reduced net deposit once every claim has resolved.
    ///
    /// The claims boundary calls this after applying the last approved
    /// deduction; it is also safe to call directly as a retry, since the
    /// processor call is idempotency-keyed per booking and the settle step
    /// is guarded by a conditional update on the settlement state. A repeat
    /// call after settlement observes the recorded outcome and returns it
    /// with `already_decided = true`.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::AlreadyDecided` when the release went
    /// through the normal approval path, `NotEligible` when no claim
    /// decision is recorded, `ClaimsUnresolved` while any claim is still
    /// filed or approved-but-unapplied, `PreconditionFailed` on a lost
    /// settle race, or `Database`/`Deposit` errors.
    pub async fn release_after_claim(
        &self,
        booking_id: Uuid,
    ) -> Result<SettlementOutcome, SettlementError> {
        let booking = self.find_booking(booking_id).await?;

        SettlementReview::release_after_claim(
            booking.status.clone().into(),
            booking.host_review_status.clone().into(),
        )?;

        if booking.settlement_state == SettlementState::Settled {
            return Ok(Self::decided_outcome(booking));
        }

        let open_claims = claims::Entity::find()
            .filter(claims::Column::BookingId.eq(booking_id))
            .all(&self.db)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?
            .into_iter()
            .filter(|claim| match claim.status {
                ClaimStatus::Filed => true,
                ClaimStatus::Approved => claim.applied_at.is_none(),
                ClaimStatus::Withdrawn => false,
            })
            .count();
        if open_claims > 0 {
            return Err(SettlementError::ClaimsUnresolved {
                booking_id,
                open_claims,
            });
        }

        // The snapshot already reflects every applied deduction, so this is
        // the reduced net amount.
        let net_release = DepositLedger::net_release(&deposit_snapshot(&booking))?;

        let refund = if net_release.card_portion > Decimal::ZERO {
            let minor = to_minor_units(net_release.card_portion)
                .map_err(|e| SettlementError::Amount(e.to_string()))?;
            match self.processor.release(booking_id, minor).await {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        %booking_id,
                        error = %e,
                        "processor release failed; flagging for reconciliation"
                    );
                    return self.flag_reconciliation(booking_id, net_release, &e).await;
                }
            }
        } else {
            None
        };

        let booking = self
            .record_release(booking_id, net_release, refund.as_ref())
            .await?;

        self.notify_parties(
            &booking,
            "deposit_released",
            json!({
                "booking_id": booking_id,
                "wallet_portion": net_release.wallet_portion,
                "card_portion": net_release.card_portion,
                "deposit_used_for_claim": booking.deposit_used_for_claim,
            }),
        )
        .await;

        Ok(SettlementOutcome {
            booking,
            net_release,
            settlement_state: CoreSettlementState::Settled,
            refund,
            release_complete: true,
            already_decided: false,
        })
    }

    /// Lists bookings flagged for manual reconciliation.
    ///
    /// Covers both explicit flags and the crash window between a committed
    /// approval and the recorded release: an `approved` booking whose
    /// settlement is still `pending` is equally stuck, since a repeat
    /// approval observes the recorded decision and moves nothing.
    ///
    /// # Errors
    ///
    /// Returns `SettlementError::Database` on storage failure.
    pub async fn reconciliation_queue(&self) -> Result<Vec<bookings::Model>, SettlementError> {
        bookings::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        bookings::Column::SettlementState
                            .eq(SettlementState::ReconciliationRequired),
                    )
                    .add(
                        Condition::all()
                            .add(
                                bookings::Column::HostReviewStatus
                                    .eq(HostReviewStatus::Approved),
                            )
                            .add(
                                bookings::Column::SettlementState.eq(SettlementState::Pending),
                            ),
                    ),
            )
            .all(&self.db)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))
    }

    async fn find_booking(&self, booking_id: Uuid) -> Result<bookings::Model, SettlementError> {
        bookings::Entity::find_by_id(booking_id)
            .one(&self.db)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?
            .ok_or(SettlementError::BookingNotFound(booking_id))
    }

    /// Conditionally commits the review transition; 0 rows means the
    /// precondition was lost to a concurrent writer.
    async fn commit_decision(
        &self,
        booking: &bookings::Model,
        review_status: HostReviewStatus,
        status: BookingStatus,
    ) -> Result<(), SettlementError> {
        let result = bookings::Entity::update_many()
            .col_expr(bookings::Column::Status, status.as_enum())
            .col_expr(bookings::Column::HostReviewStatus, review_status.as_enum())
            .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(bookings::Column::Id.eq(booking.id))
            .filter(bookings::Column::Status.eq(BookingStatus::Completed))
            .filter(bookings::Column::HostReviewStatus.eq(HostReviewStatus::PendingReview))
            .exec(&self.db)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(SettlementError::PreconditionFailed);
        }
        Ok(())
    }

    async fn audit_standalone(
        &self,
        booking_id: Uuid,
        event: &AuditEvent,
    ) -> Result<(), SettlementError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;
        AuditRepository::append(&txn, BOOKING_RESOURCE, booking_id, event).await?;
        txn.commit()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;
        Ok(())
    }

    async fn flag_reconciliation(
        &self,
        booking_id: Uuid,
        net_release: NetRelease,
        cause: &(dyn std::error::Error + Send + Sync),
    ) -> Result<SettlementOutcome, SettlementError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        bookings::Entity::update_many()
            .col_expr(
                bookings::Column::SettlementState,
                SettlementState::ReconciliationRequired.as_enum(),
            )
            .col_expr(bookings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(bookings::Column::Id.eq(booking_id))
            .exec(&txn)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        AuditRepository::append(
            &txn,
            BOOKING_RESOURCE,
            booking_id,
            &AuditEvent {
                category: "settlement".to_string(),
                event_type: "release_failed".to_string(),
                severity: AuditSeverity::Warning,
                action: "Card release failed; flagged for reconciliation".to_string(),
                amount: Some(net_release.card_portion),
                metadata: json!({
                    "idempotency_key": release_idempotency_key(booking_id),
                    "cause": cause.to_string(),
                }),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        let booking = self.find_booking(booking_id).await?;
        Ok(SettlementOutcome {
            booking,
            net_release,
            settlement_state: CoreSettlementState::ReconciliationRequired,
            refund: None,
            release_complete: false,
            already_decided: false,
        })
    }

    async fn record_release(
        &self,
        booking_id: Uuid,
        net_release: NetRelease,
        refund: Option<&RefundRecord>,
    ) -> Result<bookings::Model, SettlementError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        let booking = bookings::Entity::find_by_id(booking_id)
            .one(&txn)
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?
            .ok_or(SettlementError::BookingNotFound(booking_id))?;

        if net_release.wallet_portion > Decimal::ZERO {
            WalletRepository::credit_on(
                &txn,
                booking.guest_id,
                net_release.wallet_portion,
                Some(booking_id),
                WalletEntryType::Release,
                "Deposit release: wallet-funded portion",
            )
            .await
            .map_err(|e| match e {
                WalletError::Audit(a) => SettlementError::Audit(a),
                other => SettlementError::Database(other.to_string()),
            })?;
        }

        let now = Utc::now();
        let guest_id = booking.guest_id;
        // Total net release regardless of split: the refunded figure is
        // what left the deposit, not just what went through the processor.
        // Conditional on not being settled yet, so a racing release rolls
        // back its wallet credit instead of paying twice; the filter still
        // admits retries out of `reconciliation_required`.
        let result = bookings::Entity::update_many()
            .col_expr(
                bookings::Column::DepositRefunded,
                Expr::value(net_release.total()),
            )
            .col_expr(
                bookings::Column::SettlementState,
                SettlementState::Settled.as_enum(),
            )
            .col_expr(bookings::Column::UpdatedAt, Expr::value(now))
            .filter(bookings::Column::Id.eq(booking_id))
            .filter(bookings::Column::SettlementState.ne(SettlementState::Settled))
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
                category: "settlement".to_string(),
                event_type: "deposit_released".to_string(),
                severity: AuditSeverity::Info,
                action: "Net deposit released to guest".to_string(),
                amount: Some(net_release.total()),
                metadata: json!({
                    "guest_id": guest_id,
                    "wallet_portion": net_release.wallet_portion,
                    "card_portion": net_release.card_portion,
                    "refund_id": refund.map(|r| r.refund_id.clone()),
                    "idempotency_key": release_idempotency_key(booking_id),
                }),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| SettlementError::Database(e.to_string()))?;

        info!(
            %booking_id,
            total = %net_release.total(),
            wallet = %net_release.wallet_portion,
            card = %net_release.card_portion,
            "deposit released"
        );

        self.find_booking(booking_id).await
    }

    fn decided_outcome(booking: bookings::Model) -> SettlementOutcome {
        let settlement_state: CoreSettlementState = booking.settlement_state.clone().into();
        let release_complete = settlement_state == CoreSettlementState::Settled;
        SettlementOutcome {
            net_release: NetRelease {
                wallet_portion: Decimal::ZERO,
                card_portion: Decimal::ZERO,
            },
            settlement_state,
            refund: None,
            release_complete,
            already_decided: true,
            booking,
        }
    }

    /// Best-effort notice to both sides of the booking.
    async fn notify_parties(
        &self,
        booking: &bookings::Model,
        template: &str,
        data: serde_json::Value,
    ) {
        self.notify_best_effort(booking.guest_id, template, data.clone())
            .await;
        self.notify_best_effort(booking.host_id, template, data).await;
    }

    async fn notify_best_effort(&self, recipient: Uuid, template: &str, data: serde_json::Value) {
        let notification = Notification {
            recipient,
            template: template.to_string(),
            data,
        };
        if let Err(e) = self.notifier.notify(notification).await {
            warn!(template, error = %e, "notification delivery failed");
        }
    }
}
