//! Audit chain repository.
//!
//! Appends are designed to be called inside the caller's open transaction,
//! so a chain entry exists exactly when the domain write it describes was
//! committed. A `(resource, resource_id, seq)` unique index backs the
//! per-scope ordering; a lost append race surfaces as a database error
//! rather than a forked chain.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{error, info};
use uuid::Uuid;

use rovia_core::audit::{self, AuditError, AuditEvent, ChainEntry, ChainReport};

use crate::entities::{audit_chain_faults, audit_log};

/// Repository for the tamper-evident audit log.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an event to a scope's chain inside `conn`.
    ///
    /// `conn` is expected to be the transaction carrying the domain write
    /// this entry describes.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::ChainHalted` if a fault is recorded for the
    /// scope, or `AuditError::Database` on storage failure.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        resource: &str,
        resource_id: Uuid,
        event: &AuditEvent,
    ) -> Result<audit_log::Model, AuditError> {
        let halted = audit_chain_faults::Entity::find()
            .filter(audit_chain_faults::Column::Resource.eq(resource))
            .filter(audit_chain_faults::Column::ResourceId.eq(resource_id))
            .one(conn)
            .await
            .map_err(|e| AuditError::Database(e.to_string()))?;
        if halted.is_some() {
            return Err(AuditError::ChainHalted {
                resource: resource.to_string(),
                resource_id: resource_id.to_string(),
            });
        }

        let last = audit_log::Entity::find()
            .filter(audit_log::Column::Resource.eq(resource))
            .filter(audit_log::Column::ResourceId.eq(resource_id))
            .order_by_desc(audit_log::Column::Seq)
            .one(conn)
            .await
            .map_err(|e| AuditError::Database(e.to_string()))?;

        let (seq, previous_hash) = match last {
            Some(entry) => (entry.seq + 1, Some(entry.hash)),
            None => (1, None),
        };

        let hash = audit::chain_hash(&event.canonical_payload(), previous_hash.as_deref());

        let model = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            resource: Set(resource.to_string()),
            resource_id: Set(resource_id),
            seq: Set(seq),
            category: Set(event.category.clone()),
            event_type: Set(event.event_type.clone()),
            severity: Set(event.severity.into()),
            action: Set(event.action.clone()),
            amount: Set(event.amount),
            metadata: Set(event.metadata.clone()),
            hash: Set(hash),
            previous_hash: Set(previous_hash),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
        .map_err(|e| AuditError::Database(e.to_string()))?;

        Ok(model)
    }

    /// Walks a scope's chain in sequence order, recomputing every hash.
    ///
    /// A failed verification records an `audit_chain_faults` row, which
    /// halts all further appends to the scope until an operator clears it.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Database` on storage failure.
    pub async fn verify_chain(
        &self,
        resource: &str,
        resource_id: Uuid,
    ) -> Result<ChainReport, AuditError> {
        let models = self.entries(resource, resource_id).await?;
        let chain: Vec<ChainEntry> = models.into_iter().map(to_chain_entry).collect();

        let report = audit::verify(&chain);
        if let ChainReport::Broken {
            first_bad_seq,
            ref detail,
        } = report
        {
            error!(
                resource,
                %resource_id,
                first_bad_seq,
                detail,
                "audit chain verification failed; halting scope"
            );
            self.record_fault(resource, resource_id, first_bad_seq, detail)
                .await?;
        } else {
            info!(resource, %resource_id, "audit chain verified");
        }

        Ok(report)
    }

    /// Returns a scope's entries in sequence order.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Database` on storage failure.
    pub async fn entries(
        &self,
        resource: &str,
        resource_id: Uuid,
    ) -> Result<Vec<audit_log::Model>, AuditError> {
        audit_log::Entity::find()
            .filter(audit_log::Column::Resource.eq(resource))
            .filter(audit_log::Column::ResourceId.eq(resource_id))
            .order_by_asc(audit_log::Column::Seq)
            .all(&self.db)
            .await
            .map_err(|e| AuditError::Database(e.to_string()))
    }

    /// Returns the recorded fault for a scope, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::Database` on storage failure.
    pub async fn fault(
        &self,
        resource: &str,
        resource_id: Uuid,
    ) -> Result<Option<audit_chain_faults::Model>, AuditError> {
        audit_chain_faults::Entity::find()
            .filter(audit_chain_faults::Column::Resource.eq(resource))
            .filter(audit_chain_faults::Column::ResourceId.eq(resource_id))
            .one(&self.db)
            .await
            .map_err(|e| AuditError::Database(e.to_string()))
    }

    async fn record_fault(
        &self,
        resource: &str,
        resource_id: Uuid,
        first_bad_seq: i64,
        detail: &str,
    ) -> Result<(), AuditError> {
        // A fault may already exist from an earlier verification run; the
        // first recorded one stands.
        if self.fault(resource, resource_id).await?.is_some() {
            return Ok(());
        }

        audit_chain_faults::ActiveModel {
            id: Set(Uuid::new_v4()),
            resource: Set(resource.to_string()),
            resource_id: Set(resource_id),
            first_bad_seq: Set(first_bad_seq),
            detail: Set(detail.to_string()),
            detected_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| AuditError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Rebuilds the pure chain entry a stored row represents.
fn to_chain_entry(model: audit_log::Model) -> ChainEntry {
    ChainEntry {
        seq: model.seq,
        event: AuditEvent {
            category: model.category,
            event_type: model.event_type,
            severity: model.severity.into(),
            action: model.action,
            amount: model.amount,
            metadata: model.metadata,
        },
        hash: model.hash,
        previous_hash: model.previous_hash,
    }
}
