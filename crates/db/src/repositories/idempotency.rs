//! Idempotency guard.
//!
//! A keyed operation runs inside one database transaction together with the
//! insert of its recorded response, so either both the side effects and the
//! record commit or neither does. Concurrent first-time callers with the same
//! key are serialized on a transaction-scoped advisory lock; the one that waits
//! finds the record written by the other and replays it.

use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use paylane_core::idempotency::{IdempotencyKey, IdempotentOutcome, StoredResponse};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, EntityTrait, Set,
    Statement, TransactionTrait,
};
use tracing::{debug, warn};

use crate::entities::idempotency_keys;

/// Future returned by a guarded operation, borrowing the guard's transaction.
pub type GuardedFuture<'c> =
    Pin<Box<dyn Future<Output = Result<StoredResponse, DbErr>> + Send + 'c>>;

/// Idempotency repository.
#[derive(Debug, Clone)]
pub struct IdempotencyRepository {
    db: DatabaseConnection,
}

impl IdempotencyRepository {
    /// Creates a new idempotency repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs `operation` at most once per key and replays its recorded response.
    ///
    /// The operation receives the guard's transaction and must do all of its
    /// writes through it. Its response is recorded only when it is a definite
    /// outcome (status below 500); otherwise the transaction is rolled back and
    /// the key stays free for a retry. Without a key the operation still runs
    /// in one transaction but nothing is recorded.
    pub async fn run<F>(
        &self,
        key: Option<&IdempotencyKey>,
        operation: F,
    ) -> Result<IdempotentOutcome, DbErr>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> GuardedFuture<'c> + Send,
    {
        if let Some(key) = key
            && let Some(stored) = Self::find_within(&self.db, key).await?
        {
            debug!(key = %key, status = stored.status, "Idempotency hit");
            return Ok(IdempotentOutcome::replayed(stored));
        }

        let txn = self.db.begin().await?;

        if let Some(key) = key {
            lock_key(&txn, key).await?;
            if let Some(stored) = Self::find_within(&txn, key).await? {
                txn.commit().await?;
                debug!(key = %key, status = stored.status, "Idempotency hit after wait");
                return Ok(IdempotentOutcome::replayed(stored));
            }
        }

        let response = match operation(&txn).await {
            Ok(response) => response,
            Err(err) => {
                rollback(txn).await;
                return Err(err);
            }
        };

        if !response.is_recordable() {
            rollback(txn).await;
            return Ok(IdempotentOutcome::fresh(response));
        }

        if let Some(key) = key {
            Self::insert_if_absent(&txn, key, &response).await?;
        }
        txn.commit().await?;

        Ok(IdempotentOutcome::fresh(response))
    }

    /// Looks up the recorded response for `key`.
    pub async fn find(&self, key: &IdempotencyKey) -> Result<Option<StoredResponse>, DbErr> {
        Self::find_within(&self.db, key).await
    }

    /// Looks up the recorded response for `key` on `conn`.
    pub async fn find_within<C>(
        conn: &C,
        key: &IdempotencyKey,
    ) -> Result<Option<StoredResponse>, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(record) = idempotency_keys::Entity::find_by_id(key.as_str().to_string())
            .one(conn)
            .await?
        else {
            return Ok(None);
        };

        let status = u16::try_from(record.response_status)
            .map_err(|_| DbErr::Type(format!("invalid stored status {}", record.response_status)))?;

        Ok(Some(StoredResponse {
            status,
            body: record.response_body,
        }))
    }

    /// Records `response` for `key` unless a record already exists.
    ///
    /// Returns false when another writer got there first; that record is kept.
    pub async fn insert_if_absent<C>(
        conn: &C,
        key: &IdempotencyKey,
        response: &StoredResponse,
    ) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let record = idempotency_keys::ActiveModel {
            key_id: Set(key.as_str().to_string()),
            response_status: Set(i32::from(response.status)),
            response_body: Set(response.body.clone()),
            created_at: Set(Utc::now().into()),
        };

        let inserted = idempotency_keys::Entity::insert(record)
            .on_conflict(
                OnConflict::column(idempotency_keys::Column::KeyId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;

        Ok(inserted > 0)
    }
}

/// Takes a transaction-scoped advisory lock derived from the key.
async fn lock_key(txn: &DatabaseTransaction, key: &IdempotencyKey) -> Result<(), DbErr> {
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))",
        [key.as_str().into()],
    ))
    .await?;
    Ok(())
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(err) = txn.rollback().await {
        warn!(error = %err, "Rollback failed");
    }
}
