//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every mutating repository function is generic over the connection so it can
//! run on its own or inside a caller's transaction. Nested calls open a
//! savepoint.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, IdempotencyRepository, LedgerRepository, OutboxRepository, PostingError,
};

use std::time::Duration;

use paylane_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .max_lifetime(Duration::from_secs(60 * 60))
        .idle_timeout(Duration::from_secs(30 * 60))
        .sqlx_logging(false);

    Database::connect(options).await
}
