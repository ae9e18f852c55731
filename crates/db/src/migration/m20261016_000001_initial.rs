//! Initial database migration.
//!
//! Creates the ledger tables, the webhook outbox, and the idempotency record
//! table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: LEDGER
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(ENTRIES_SQL).await?;

        // ============================================================
        // PART 2: OUTBOX & IDEMPOTENCY
        // ============================================================
        db.execute_unprepared(WEBHOOK_JOBS_SQL).await?;
        db.execute_unprepared(IDEMPOTENCY_KEYS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS idempotency_keys CASCADE;
DROP TABLE IF EXISTS webhook_jobs CASCADE;
DROP TABLE IF EXISTS entries CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
",
        )
        .await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r"
-- Wallets and merchant vaults. Balance is in minor units.
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    owner_name VARCHAR(255) NOT NULL,
    balance BIGINT NOT NULL DEFAULT 0,
    currency VARCHAR(3) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_accounts_balance_non_negative CHECK (balance >= 0),
    CONSTRAINT chk_accounts_currency CHECK (currency IN ('USD', 'TZS'))
);
";

const TRANSACTIONS_SQL: &str = r"
-- Immutable record of each money movement
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    amount BIGINT NOT NULL,
    currency VARCHAR(3) NOT NULL,
    description TEXT NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'COMPLETED',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transactions_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transactions_status CHECK (status IN ('PENDING', 'COMPLETED', 'FAILED'))
);

CREATE INDEX idx_transactions_created ON transactions(created_at DESC);
";

const ENTRIES_SQL: &str = r"
-- Double-entry lines, append-only
CREATE TABLE entries (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    direction VARCHAR(6) NOT NULL,
    amount BIGINT NOT NULL,
    CONSTRAINT chk_entries_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_entries_direction CHECK (direction IN ('DEBIT', 'CREDIT'))
);

-- History lookup per account
CREATE INDEX idx_entries_account ON entries(account_id);
CREATE INDEX idx_entries_transaction ON entries(transaction_id);
";

const WEBHOOK_JOBS_SQL: &str = r"
-- Transactional outbox drained by the webhook worker
CREATE TABLE webhook_jobs (
    id UUID PRIMARY KEY,
    url TEXT NOT NULL,
    payload TEXT NOT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
    attempts INTEGER NOT NULL DEFAULT 0,
    next_run_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_webhook_jobs_status CHECK (status IN ('PENDING', 'COMPLETED', 'FAILED')),
    CONSTRAINT chk_webhook_jobs_attempts CHECK (attempts >= 0)
);

-- Dequeue scans pending rows by eligibility
CREATE INDEX idx_webhook_jobs_pending ON webhook_jobs(next_run_at, created_at)
    WHERE status = 'PENDING';
";

const IDEMPOTENCY_KEYS_SQL: &str = r"
-- Recorded responses, written at most once per key
CREATE TABLE idempotency_keys (
    key_id VARCHAR(255) PRIMARY KEY,
    response_status INTEGER NOT NULL,
    response_body BYTEA NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";
