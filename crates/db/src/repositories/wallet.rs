//! Wallet repository.
//!
//! The balance column and the append-only `wallet_transactions` history
//! move together: every balance change inserts the transaction row with
//! its `balance_after` inside the same database transaction, so the
//! history always replays to the stored balance. Mutations take the
//! account row lock first (`SELECT ... FOR UPDATE`); settlements for two
//! bookings of the same guest serialize on that lock instead of both
//! reading the same balance and losing a credit.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::OnConflict,
};
use thiserror::Error;
use uuid::Uuid;

use rovia_core::audit::AuditError;

use crate::entities::{sea_orm_active_enums::WalletEntryType, wallet_accounts, wallet_transactions};

/// Errors that can occur in wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// A credit or deduction amount must be strictly positive.
    #[error("Wallet amount must be positive: {0}")]
    NonPositiveAmount(Decimal),

    /// The deduction would overdraw the account.
    #[error("Insufficient wallet balance: {balance} available, {requested} requested")]
    InsufficientBalance {
        /// Balance at the time of the attempt.
        balance: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// No wallet account exists for the guest.
    #[error("Wallet account not found for guest {0}")]
    AccountNotFound(Uuid),

    /// Audit chain failure during recording.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WalletError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount(_) => 400,
            Self::InsufficientBalance { .. } => 409,
            Self::AccountNotFound(_) => 404,
            Self::Audit(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_WALLET_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_WALLET_BALANCE",
            Self::AccountNotFound(_) => "WALLET_ACCOUNT_NOT_FOUND",
            Self::Audit(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Repository for guest wallet accounts and their transaction history.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Credits a guest's wallet in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::NonPositiveAmount` for a zero or negative
    /// amount, or `WalletError::Database` on storage failure.
    pub async fn credit(
        &self,
        guest_id: Uuid,
        amount: Decimal,
        booking_id: Option<Uuid>,
        entry_type: WalletEntryType,
        reason: &str,
    ) -> Result<wallet_transactions::Model, WalletError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WalletError::Database(e.to_string()))?;
        let entry =
            Self::credit_on(&txn, guest_id, amount, booking_id, entry_type, reason).await?;
        txn.commit()
            .await
            .map_err(|e| WalletError::Database(e.to_string()))?;
        Ok(entry)
    }

    /// Credits a guest's wallet inside the caller's transaction.
    ///
    /// Creates the account on first credit. The balance update and the
    /// history row land in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::NonPositiveAmount` for a zero or negative
    /// amount, or `WalletError::Database` on storage failure.
    pub async fn credit_on<C: ConnectionTrait>(
        conn: &C,
        guest_id: Uuid,
        amount: Decimal,
        booking_id: Option<Uuid>,
        entry_type: WalletEntryType,
        reason: &str,
    ) -> Result<wallet_transactions::Model, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::NonPositiveAmount(amount));
        }

        let account = Self::find_or_create_account(conn, guest_id).await?;
        let balance_after = account.balance + amount;
        Self::apply(conn, account, balance_after, booking_id, entry_type, amount, reason).await
    }

    /// Deducts from a guest's wallet inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InsufficientBalance` if the deduction would
    /// overdraw the account, `WalletError::AccountNotFound` if the guest
    /// has no wallet, or `WalletError::Database` on storage failure.
    pub async fn deduct_on<C: ConnectionTrait>(
        conn: &C,
        guest_id: Uuid,
        amount: Decimal,
        booking_id: Option<Uuid>,
        reason: &str,
    ) -> Result<wallet_transactions::Model, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::NonPositiveAmount(amount));
        }

        let account = Self::locked_account(conn, guest_id)
            .await?
            .ok_or(WalletError::AccountNotFound(guest_id))?;

        if account.balance < amount {
            return Err(WalletError::InsufficientBalance {
                balance: account.balance,
                requested: amount,
            });
        }

        let balance_after = account.balance - amount;
        Self::apply(
            conn,
            account,
            balance_after,
            booking_id,
            WalletEntryType::Deduct,
            amount,
            reason,
        )
        .await
    }

    /// Returns a guest's wallet account, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Database` on storage failure.
    pub async fn account(
        &self,
        guest_id: Uuid,
    ) -> Result<Option<wallet_accounts::Model>, WalletError> {
        wallet_accounts::Entity::find()
            .filter(wallet_accounts::Column::GuestId.eq(guest_id))
            .one(&self.db)
            .await
            .map_err(|e| WalletError::Database(e.to_string()))
    }

    /// Returns a guest's transaction history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Database` on storage failure.
    pub async fn history(
        &self,
        guest_id: Uuid,
    ) -> Result<Vec<wallet_transactions::Model>, WalletError> {
        let Some(account) = self.account(guest_id).await? else {
            return Ok(Vec::new());
        };

        wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletAccountId.eq(account.id))
            .order_by_desc(wallet_transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| WalletError::Database(e.to_string()))
    }

    async fn find_or_create_account<C: ConnectionTrait>(
        conn: &C,
        guest_id: Uuid,
    ) -> Result<wallet_accounts::Model, WalletError> {
        if let Some(account) = Self::locked_account(conn, guest_id).await? {
            return Ok(account);
        }

        // First credit for this guest. A concurrent creator may win the
        // insert; `guest_id` is unique, the conflict is ignored, and the
        // locked re-read returns whichever row committed.
        let now = Utc::now().into();
        let fresh = wallet_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            guest_id: Set(guest_id),
            balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };
        wallet_accounts::Entity::insert(fresh)
            .on_conflict(
                OnConflict::column(wallet_accounts::Column::GuestId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| WalletError::Database(e.to_string()))?;

        Self::locked_account(conn, guest_id)
            .await?
            .ok_or(WalletError::AccountNotFound(guest_id))
    }

    /// Fetches the account under `FOR UPDATE` so balance mutations within
    /// the surrounding transaction serialize per guest.
    async fn locked_account<C: ConnectionTrait>(
        conn: &C,
        guest_id: Uuid,
    ) -> Result<Option<wallet_accounts::Model>, WalletError> {
        wallet_accounts::Entity::find()
            .filter(wallet_accounts::Column::GuestId.eq(guest_id))
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| WalletError::Database(e.to_string()))
    }

    async fn apply<C: ConnectionTrait>(
        conn: &C,
        account: wallet_accounts::Model,
        balance_after: Decimal,
        booking_id: Option<Uuid>,
        entry_type: WalletEntryType,
        amount: Decimal,
        reason: &str,
    ) -> Result<wallet_transactions::Model, WalletError> {
        let account_id = account.id;

        let mut active: wallet_accounts::ActiveModel = account.into();
        active.balance = Set(balance_after);
        active.updated_at = Set(Utc::now().into());
        active
            .update(conn)
            .await
            .map_err(|e| WalletError::Database(e.to_string()))?;

        wallet_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            wallet_account_id: Set(account_id),
            booking_id: Set(booking_id),
            entry_type: Set(entry_type),
            amount: Set(amount),
            balance_after: Set(balance_after),
            reason: Set(reason.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
        .map_err(|e| WalletError::Database(e.to_string()))
    }
}
