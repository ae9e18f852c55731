//! Account repository for wallet and merchant account operations.

use chrono::Utc;
use paylane_core::ledger::{Account, validate_owner_name};
use paylane_shared::types::{AccountId, Currency};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::info;

use crate::entities::accounts;
use crate::repositories::PostingError;

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens an account with a zero balance.
    pub async fn create(
        &self,
        owner_name: &str,
        currency: Currency,
    ) -> Result<Account, PostingError> {
        Self::create_within(&self.db, owner_name, currency).await
    }

    /// Finds an account by ID.
    pub async fn find(&self, id: AccountId) -> Result<Option<Account>, DbErr> {
        Self::find_within(&self.db, id).await
    }

    /// Opens an account on `conn`.
    pub async fn create_within<C>(
        conn: &C,
        owner_name: &str,
        currency: Currency,
    ) -> Result<Account, PostingError>
    where
        C: ConnectionTrait,
    {
        validate_owner_name(owner_name)?;

        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            owner_name: Set(owner_name.trim().to_string()),
            balance: Set(0),
            currency: Set(currency.into()),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await?;

        info!(account_id = %account.id, currency = %currency, "Account created");
        Ok(account.into())
    }

    /// Finds an account by ID on `conn`.
    pub async fn find_within<C>(conn: &C, id: AccountId) -> Result<Option<Account>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(accounts::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await?
            .map(Account::from))
    }
}
