//! Ledger repository: deposits, transfers, and history.
//!
//! Each posting runs in its own unit of work opened on the connection it is
//! given. Called on a [`DatabaseConnection`] that is a real transaction; called
//! inside a caller's [`DatabaseTransaction`] it is a savepoint, so a rejected
//! posting leaves the caller's transaction usable.

use chrono::Utc;
use paylane_core::ledger::{
    AccountSnapshot, Direction, ErrorKind, HistoryItem, LedgerError, TRANSFER_DESCRIPTION,
    Transaction, TransactionStatus, history_limit, plan_deposit, plan_transfer, validate_amount,
    validate_transfer,
};
use paylane_shared::types::{AccountId, EntryId, Money, TransactionId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::{
    accounts, entries,
    sea_orm_active_enums::{CurrencyCode, TransactionState},
    transactions,
};

/// Error from a posting: either a ledger rule or the store.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// A ledger rule rejected the posting. Nothing was written.
    #[error(transparent)]
    Rule(#[from] LedgerError),

    /// Store failure. The outcome is unknown.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PostingError {
    /// Error class of the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Rule(err) => err.kind(),
            Self::Database(_) => ErrorKind::Infrastructure,
        }
    }

    /// Returns true if the caller may safely retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Infrastructure)
    }
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Credits `amount` to an account from outside the ledger.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
    ) -> Result<Transaction, PostingError> {
        Self::deposit_within(&self.db, account_id, amount, description).await
    }

    /// Moves `amount` from one account to another.
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> Result<Transaction, PostingError> {
        Self::transfer_within(&self.db, from, to, amount).await
    }

    /// Returns the most recent entries of an account with their transactions.
    pub async fn history(
        &self,
        account_id: AccountId,
        limit: Option<u64>,
    ) -> Result<Vec<HistoryItem>, PostingError> {
        Self::history_within(&self.db, account_id, limit).await
    }

    /// Deposit on `conn`.
    ///
    /// The balance is incremented in place, so concurrent deposits never
    /// read-modify-write and need no row lock. The update only matches while
    /// the new balance fits in an `i64`; an overflowing deposit is rejected
    /// with [`LedgerError::BalanceOverflow`].
    pub async fn deposit_within<C>(
        conn: &C,
        account_id: AccountId,
        amount: i64,
        description: &str,
    ) -> Result<Transaction, PostingError>
    where
        C: TransactionTrait,
    {
        validate_amount(amount)?;

        let txn = conn.begin().await?;

        let updated = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(amount),
            )
            .filter(accounts::Column::Id.eq(account_id.into_inner()))
            .filter(accounts::Column::Balance.lte(i64::MAX - amount))
            .exec_with_returning(&txn)
            .await?;

        let Some(account) = updated.into_iter().next() else {
            // No row matched: the account is missing or the increment would overflow.
            let err = match lock_account(&txn, account_id).await? {
                Some(model) => plan_deposit(snapshot(&model), amount)
                    .err()
                    .unwrap_or(LedgerError::BalanceOverflow(account_id)),
                None => LedgerError::AccountNotFound(account_id),
            };
            return abort(txn, err).await;
        };

        let transaction = insert_transaction(&txn, amount, account.currency, description).await?;
        insert_entry(&txn, transaction.id, account.id, Direction::Credit, amount).await?;

        txn.commit().await?;

        info!(
            transaction_id = %transaction.id,
            account_id = %account_id,
            amount = %Money::new(amount, account.currency.into()),
            "Deposit posted"
        );
        Ok(transaction.into())
    }

    /// Transfer on `conn`.
    ///
    /// Both rows are locked in ascending id order before the balance check and
    /// stay locked until commit, so two transfers sharing an account serialize
    /// and opposite transfers cannot deadlock.
    pub async fn transfer_within<C>(
        conn: &C,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> Result<Transaction, PostingError>
    where
        C: TransactionTrait,
    {
        validate_transfer(from, to, amount)?;

        let txn = conn.begin().await?;

        let (first, second) = if from < to {
            (from, to)
        } else {
            (to, from)
        };
        let Some(first_row) = lock_account(&txn, first).await? else {
            return abort(txn, LedgerError::AccountNotFound(first)).await;
        };
        let Some(second_row) = lock_account(&txn, second).await? else {
            return abort(txn, LedgerError::AccountNotFound(second)).await;
        };
        let (source, destination) = if first == from {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        let changes = match plan_transfer(snapshot(&source), snapshot(&destination), amount) {
            Ok(changes) => changes,
            Err(err) => {
                debug!(from = %from, to = %to, amount, error = %err, "Transfer rejected");
                return abort(txn, err).await;
            }
        };

        let transaction =
            insert_transaction(&txn, amount, source.currency, TRANSFER_DESCRIPTION).await?;

        for change in changes {
            accounts::ActiveModel {
                id: Set(change.account_id.into_inner()),
                balance: Set(change.new_balance),
                ..Default::default()
            }
            .update(&txn)
            .await?;

            insert_entry(
                &txn,
                transaction.id,
                change.account_id.into_inner(),
                change.direction,
                change.amount,
            )
            .await?;
        }

        txn.commit().await?;

        info!(
            transaction_id = %transaction.id,
            from = %from,
            to = %to,
            amount = %Money::new(amount, source.currency.into()),
            "Transfer posted"
        );
        Ok(transaction.into())
    }

    /// History on `conn`, newest first, bounded in the query.
    pub async fn history_within<C>(
        conn: &C,
        account_id: AccountId,
        limit: Option<u64>,
    ) -> Result<Vec<HistoryItem>, PostingError>
    where
        C: ConnectionTrait,
    {
        let exists = accounts::Entity::find_by_id(account_id.into_inner())
            .one(conn)
            .await?
            .is_some();
        if !exists {
            return Err(LedgerError::AccountNotFound(account_id).into());
        }

        let rows = entries::Entity::find()
            .filter(entries::Column::AccountId.eq(account_id.into_inner()))
            .find_also_related(transactions::Entity)
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(history_limit(limit))
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, transaction)| {
                transaction.map(|transaction| HistoryItem {
                    transaction: transaction.into(),
                    direction: entry.direction.into(),
                })
            })
            .collect())
    }
}

async fn lock_account(
    txn: &DatabaseTransaction,
    id: AccountId,
) -> Result<Option<accounts::Model>, DbErr> {
    accounts::Entity::find_by_id(id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await
}

fn snapshot(model: &accounts::Model) -> AccountSnapshot {
    AccountSnapshot {
        id: AccountId::from_uuid(model.id),
        balance: model.balance,
        currency: model.currency.into(),
    }
}

async fn abort<T>(txn: DatabaseTransaction, err: LedgerError) -> Result<T, PostingError> {
    txn.rollback().await?;
    Err(err.into())
}

async fn insert_transaction(
    txn: &DatabaseTransaction,
    amount: i64,
    currency: CurrencyCode,
    description: &str,
) -> Result<transactions::Model, DbErr> {
    transactions::ActiveModel {
        id: Set(TransactionId::new().into_inner()),
        amount: Set(amount),
        currency: Set(currency),
        description: Set(description.to_string()),
        status: Set(TransactionState::from(TransactionStatus::Completed)),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await
}

async fn insert_entry(
    txn: &DatabaseTransaction,
    transaction_id: uuid::Uuid,
    account_id: uuid::Uuid,
    direction: Direction,
    amount: i64,
) -> Result<entries::Model, DbErr> {
    entries::ActiveModel {
        id: Set(EntryId::new().into_inner()),
        transaction_id: Set(transaction_id),
        account_id: Set(account_id),
        direction: Set(direction.into()),
        amount: Set(amount),
    }
    .insert(txn)
    .await
}
