//! Partner repository and commission recalculation.
//!
//! `fleet_size` is derived state: it is recounted from active vehicles on
//! every recalculation, never incremented in place.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use rovia_core::audit::{AuditEvent, AuditSeverity};
use rovia_core::commission::{CommissionError, RateChange, TierSchedule};

use crate::entities::{commission_history, partners, vehicles};
use crate::repositories::audit::AuditRepository;

/// Audit scope name for partner events.
pub const PARTNER_RESOURCE: &str = "partner";

/// Repository for partner fleets and commission rates.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    db: DatabaseConnection,
}

impl PartnerRepository {
    /// Creates a new partner repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches a partner by id.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::PartnerNotFound` if absent, or
    /// `CommissionError::Database` on storage failure.
    pub async fn find_by_id(&self, partner_id: Uuid) -> Result<partners::Model, CommissionError> {
        partners::Entity::find_by_id(partner_id)
            .one(&self.db)
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?
            .ok_or(CommissionError::PartnerNotFound(partner_id))
    }

    /// Recounts the fleet and recomputes the partner's commission rate.
    ///
    /// An unchanged rate is a no-op: fleet size is still refreshed, but no
    /// history row and no audit entry are written. A changed rate updates
    /// the partner, inserts one `commission_history` row, and appends one
    /// audit entry, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::PartnerNotFound` if the partner is absent,
    /// a schedule validation error if the partner's overrides are invalid,
    /// or `CommissionError::Database` on storage failure.
    pub async fn recalculate(
        &self,
        partner_id: Uuid,
        changed_by: Option<Uuid>,
        reason: &str,
    ) -> Result<Option<commission_history::Model>, CommissionError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?;

        let history = Self::recalculate_on(&txn, partner_id, changed_by, reason).await?;

        txn.commit()
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?;

        Ok(history)
    }

    /// Flips a vehicle's active flag and recalculates the owning partner.
    ///
    /// Both writes share one transaction, so the stored fleet size cannot
    /// drift from the vehicle table.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::VehicleNotFound` if the vehicle is absent,
    /// or any error from the recalculation.
    pub async fn set_vehicle_active(
        &self,
        vehicle_id: Uuid,
        active: bool,
        changed_by: Option<Uuid>,
    ) -> Result<Option<commission_history::Model>, CommissionError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?;

        let vehicle = vehicles::Entity::find_by_id(vehicle_id)
            .one(&txn)
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?
            .ok_or(CommissionError::VehicleNotFound(vehicle_id))?;

        let partner_id = vehicle.partner_id;
        let mut active_model: vehicles::ActiveModel = vehicle.into();
        active_model.is_active = Set(active);
        active_model.updated_at = Set(Utc::now().into());
        active_model
            .update(&txn)
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?;

        let reason = if active {
            "vehicle_activated"
        } else {
            "vehicle_deactivated"
        };
        let history = Self::recalculate_on(&txn, partner_id, changed_by, reason).await?;

        txn.commit()
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?;

        Ok(history)
    }

    /// Lists a partner's commission rate changes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Database` on storage failure.
    pub async fn history(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<commission_history::Model>, CommissionError> {
        commission_history::Entity::find()
            .filter(commission_history::Column::PartnerId.eq(partner_id))
            .order_by_desc(commission_history::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))
    }

    async fn recalculate_on<C: ConnectionTrait>(
        conn: &C,
        partner_id: Uuid,
        changed_by: Option<Uuid>,
        reason: &str,
    ) -> Result<Option<commission_history::Model>, CommissionError> {
        let partner = partners::Entity::find_by_id(partner_id)
            .one(conn)
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?
            .ok_or(CommissionError::PartnerNotFound(partner_id))?;

        let fleet_size = i32::try_from(
            vehicles::Entity::find()
                .filter(vehicles::Column::PartnerId.eq(partner_id))
                .filter(vehicles::Column::IsActive.eq(true))
                .count(conn)
                .await
                .map_err(|e| CommissionError::Database(e.to_string()))?,
        )
        .map_err(|e| CommissionError::Database(e.to_string()))?;

        let schedule = TierSchedule::with_overrides(
            partner.tier1_min,
            partner.tier2_min,
            partner.tier3_min,
            partner.base_rate,
            partner.tier1_rate,
            partner.tier2_rate,
            partner.tier3_rate,
        )?;

        let change = RateChange::evaluate(&schedule, partner.commission_rate, fleet_size);
        let now = Utc::now();

        let mut active: partners::ActiveModel = partner.into();
        active.fleet_size = Set(fleet_size);
        if let Some(ref change) = change {
            active.commission_rate = Set(change.new_rate);
        }
        active.updated_at = Set(now.into());
        active
            .update(conn)
            .await
            .map_err(|e| CommissionError::Database(e.to_string()))?;

        let Some(change) = change else {
            return Ok(None);
        };

        info!(
            %partner_id,
            fleet_size,
            old_rate = %change.old_rate,
            new_rate = %change.new_rate,
            reason,
            "commission rate changed"
        );

        let history = commission_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            partner_id: Set(partner_id),
            old_rate: Set(change.old_rate),
            new_rate: Set(change.new_rate),
            fleet_size: Set(fleet_size),
            reason: Set(reason.to_string()),
            changed_by: Set(changed_by),
            created_at: Set(now.into()),
        }
        .insert(conn)
        .await
        .map_err(|e| CommissionError::Database(e.to_string()))?;

        AuditRepository::append(
            conn,
            PARTNER_RESOURCE,
            partner_id,
            &AuditEvent {
                category: "commission".to_string(),
                event_type: "rate_changed".to_string(),
                severity: AuditSeverity::Info,
                action: format!(
                    "Commission rate changed from {} to {} at fleet size {}",
                    change.old_rate, change.new_rate, fleet_size
                ),
                amount: None,
                metadata: json!({
                    "old_rate": change.old_rate,
                    "new_rate": change.new_rate,
                    "fleet_size": fleet_size,
                    "reason": reason,
                    "changed_by": changed_by,
                }),
            },
        )
        .await?;

        Ok(Some(history))
    }
}
