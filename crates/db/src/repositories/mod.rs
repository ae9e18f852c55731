//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod idempotency;
pub mod ledger;
pub mod outbox;

pub use account::AccountRepository;
pub use idempotency::{GuardedFuture, IdempotencyRepository};
pub use ledger::{LedgerRepository, PostingError};
pub use outbox::OutboxRepository;
