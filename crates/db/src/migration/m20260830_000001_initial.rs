//! Initial database migration.
//!
//! Creates all enums, tables, indexes, and integrity triggers for the
//! settlement ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: PARTNERS & FLEET
        // ============================================================
        db.execute_unprepared(PARTNERS_SQL).await?;
        db.execute_unprepared(VEHICLES_SQL).await?;
        db.execute_unprepared(COMMISSION_HISTORY_SQL).await?;

        // ============================================================
        // PART 3: BOOKINGS & CLAIMS
        // ============================================================
        db.execute_unprepared(BOOKINGS_SQL).await?;
        db.execute_unprepared(CLAIMS_SQL).await?;

        // ============================================================
        // PART 4: WALLETS
        // ============================================================
        db.execute_unprepared(WALLET_ACCOUNTS_SQL).await?;
        db.execute_unprepared(WALLET_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 5: AUDIT CHAIN
        // ============================================================
        db.execute_unprepared(AUDIT_LOG_SQL).await?;
        db.execute_unprepared(AUDIT_CHAIN_FAULTS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Booking lifecycle status
CREATE TYPE booking_status AS ENUM (
    'active',
    'completed',
    'on_hold',
    'approved',
    'claim_filed',
    'no_show',
    'cancelled'
);

-- Trip progress
CREATE TYPE trip_status AS ENUM (
    'scheduled',
    'in_progress',
    'completed'
);

-- Host review decision state
CREATE TYPE host_review_status AS ENUM (
    'pending_review',
    'approved',
    'claim_filed'
);

-- Money-movement state of an approved booking
CREATE TYPE settlement_state AS ENUM (
    'pending',
    'settled',
    'reconciliation_required'
);

-- Wallet transaction type
CREATE TYPE wallet_entry_type AS ENUM (
    'release',
    'deduct',
    'credit'
);

-- Claim lifecycle
CREATE TYPE claim_status AS ENUM (
    'filed',
    'approved',
    'withdrawn'
);

-- Audit entry severity
CREATE TYPE audit_severity AS ENUM (
    'info',
    'warning',
    'critical'
);
";

const PARTNERS_SQL: &str = r"
CREATE TABLE partners (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    fleet_size INTEGER NOT NULL DEFAULT 0,
    commission_rate NUMERIC(5, 4) NOT NULL,
    tier1_min INTEGER,
    tier2_min INTEGER,
    tier3_min INTEGER,
    base_rate NUMERIC(5, 4),
    tier1_rate NUMERIC(5, 4),
    tier2_rate NUMERIC(5, 4),
    tier3_rate NUMERIC(5, 4),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fleet_size CHECK (fleet_size >= 0),
    CONSTRAINT chk_commission_rate CHECK (commission_rate >= 0 AND commission_rate <= 1)
);
";

const VEHICLES_SQL: &str = r"
CREATE TABLE vehicles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID NOT NULL REFERENCES partners(id) ON DELETE CASCADE,
    display_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_vehicles_partner_active ON vehicles(partner_id) WHERE is_active = true;
";

const COMMISSION_HISTORY_SQL: &str = r"
CREATE TABLE commission_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    partner_id UUID NOT NULL REFERENCES partners(id) ON DELETE CASCADE,
    old_rate NUMERIC(5, 4) NOT NULL,
    new_rate NUMERIC(5, 4) NOT NULL,
    fleet_size INTEGER NOT NULL,
    reason VARCHAR(255) NOT NULL,
    changed_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_changed CHECK (old_rate <> new_rate)
);

CREATE INDEX idx_commission_history_partner ON commission_history(partner_id, created_at DESC);
";

const BOOKINGS_SQL: &str = r"
CREATE TABLE bookings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    guest_id UUID NOT NULL,
    host_id UUID NOT NULL,
    vehicle_id UUID NOT NULL REFERENCES vehicles(id),
    status booking_status NOT NULL DEFAULT 'active',
    trip_status trip_status NOT NULL DEFAULT 'scheduled',
    host_review_status host_review_status NOT NULL DEFAULT 'pending_review',
    settlement_state settlement_state NOT NULL DEFAULT 'pending',
    deposit_amount NUMERIC(19, 4) NOT NULL,
    deposit_from_wallet NUMERIC(19, 4) NOT NULL DEFAULT 0,
    deposit_from_card NUMERIC(19, 4) NOT NULL DEFAULT 0,
    deposit_used_for_claim NUMERIC(19, 4) NOT NULL DEFAULT 0,
    deposit_refunded NUMERIC(19, 4) NOT NULL DEFAULT 0,
    hold_deadline TIMESTAMPTZ,
    hold_reason VARCHAR(255),
    end_date TIMESTAMPTZ NOT NULL,
    trip_ended_at TIMESTAMPTZ,
    cancellation_reason VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_deposit_non_negative CHECK (
        deposit_amount >= 0 AND deposit_from_wallet >= 0 AND deposit_from_card >= 0
    ),
    CONSTRAINT chk_deposit_split CHECK (
        deposit_from_wallet + deposit_from_card = deposit_amount
    ),
    CONSTRAINT chk_claim_within_deposit CHECK (
        deposit_used_for_claim >= 0 AND deposit_used_for_claim <= deposit_amount
    )
);

CREATE INDEX idx_bookings_guest ON bookings(guest_id);
CREATE INDEX idx_bookings_host_review ON bookings(host_id) WHERE host_review_status = 'pending_review';
CREATE INDEX idx_bookings_expirable_holds ON bookings(hold_deadline)
    WHERE status = 'on_hold' AND hold_deadline IS NOT NULL;
";

const CLAIMS_SQL: &str = r"
CREATE TABLE claims (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
    status claim_status NOT NULL DEFAULT 'filed',
    approved_deduction NUMERIC(19, 4) NOT NULL DEFAULT 0,
    applied_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_deduction_non_negative CHECK (approved_deduction >= 0)
);

CREATE INDEX idx_claims_booking ON claims(booking_id);
CREATE INDEX idx_claims_unapplied ON claims(booking_id)
    WHERE status = 'approved' AND applied_at IS NULL;
";

const WALLET_ACCOUNTS_SQL: &str = r"
CREATE TABLE wallet_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    guest_id UUID NOT NULL UNIQUE,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balance_non_negative CHECK (balance >= 0)
);
";

const WALLET_TRANSACTIONS_SQL: &str = r"
CREATE TABLE wallet_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    wallet_account_id UUID NOT NULL REFERENCES wallet_accounts(id) ON DELETE CASCADE,
    booking_id UUID REFERENCES bookings(id),
    entry_type wallet_entry_type NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    balance_after NUMERIC(19, 4) NOT NULL,
    reason VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_wallet_txn_account ON wallet_transactions(wallet_account_id, created_at DESC);
CREATE INDEX idx_wallet_txn_booking ON wallet_transactions(booking_id) WHERE booking_id IS NOT NULL;
";

const AUDIT_LOG_SQL: &str = r"
CREATE TABLE audit_log (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    resource VARCHAR(50) NOT NULL,
    resource_id UUID NOT NULL,
    seq BIGINT NOT NULL,
    category VARCHAR(50) NOT NULL,
    event_type VARCHAR(100) NOT NULL,
    severity audit_severity NOT NULL DEFAULT 'info',
    action VARCHAR(255) NOT NULL,
    amount NUMERIC(19, 4),
    metadata JSONB NOT NULL DEFAULT '{}',
    hash VARCHAR(64) NOT NULL,
    previous_hash VARCHAR(64),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_seq_positive CHECK (seq > 0),
    CONSTRAINT chk_genesis_has_no_parent CHECK (
        (seq = 1 AND previous_hash IS NULL) OR (seq > 1 AND previous_hash IS NOT NULL)
    ),
    UNIQUE (resource, resource_id, seq)
);

CREATE INDEX idx_audit_log_resource ON audit_log(resource, resource_id, seq DESC);
";

const AUDIT_CHAIN_FAULTS_SQL: &str = r"
CREATE TABLE audit_chain_faults (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    resource VARCHAR(50) NOT NULL,
    resource_id UUID NOT NULL,
    first_bad_seq BIGINT NOT NULL,
    detail TEXT NOT NULL,
    detected_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (resource, resource_id)
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_audit_mutation
-- The audit log is append-only; UPDATE and DELETE are rejected
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_audit_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'audit_log rows are immutable';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_audit_log_immutable
BEFORE UPDATE OR DELETE ON audit_log
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_mutation();

-- ============================================================
-- FUNCTION: prevent_wallet_txn_mutation
-- Wallet history is append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_wallet_txn_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'wallet_transactions rows are immutable';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_wallet_txn_immutable
BEFORE UPDATE OR DELETE ON wallet_transactions
FOR EACH ROW
EXECUTE FUNCTION prevent_wallet_txn_mutation();

-- ============================================================
-- FUNCTION: touch_updated_at
-- Keeps updated_at current on row updates
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_bookings_touch
BEFORE UPDATE ON bookings
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_claims_touch
BEFORE UPDATE ON claims
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_partners_touch
BEFORE UPDATE ON partners
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_vehicles_touch
BEFORE UPDATE ON vehicles
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_wallet_accounts_touch
BEFORE UPDATE ON wallet_accounts
FOR EACH ROW
EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_wallet_accounts_touch ON wallet_accounts;
DROP TRIGGER IF EXISTS trg_vehicles_touch ON vehicles;
DROP TRIGGER IF EXISTS trg_partners_touch ON partners;
DROP TRIGGER IF EXISTS trg_claims_touch ON claims;
DROP TRIGGER IF EXISTS trg_bookings_touch ON bookings;
DROP TRIGGER IF EXISTS trg_wallet_txn_immutable ON wallet_transactions;
DROP TRIGGER IF EXISTS trg_audit_log_immutable ON audit_log;

-- Drop functions
DROP FUNCTION IF EXISTS touch_updated_at();
DROP FUNCTION IF EXISTS prevent_wallet_txn_mutation();
DROP FUNCTION IF EXISTS prevent_audit_mutation();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS audit_chain_faults CASCADE;
DROP TABLE IF EXISTS audit_log CASCADE;
DROP TABLE IF EXISTS wallet_transactions CASCADE;
DROP TABLE IF EXISTS wallet_accounts CASCADE;
DROP TABLE IF EXISTS claims CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TABLE IF EXISTS commission_history CASCADE;
DROP TABLE IF EXISTS vehicles CASCADE;
DROP TABLE IF EXISTS partners CASCADE;

-- Drop enums
DROP TYPE IF EXISTS audit_severity CASCADE;
DROP TYPE IF EXISTS claim_status CASCADE;
DROP TYPE IF EXISTS wallet_entry_type CASCADE;
DROP TYPE IF EXISTS settlement_state CASCADE;
DROP TYPE IF EXISTS host_review_status CASCADE;
DROP TYPE IF EXISTS trip_status CASCADE;
DROP TYPE IF EXISTS booking_status CASCADE;
";
