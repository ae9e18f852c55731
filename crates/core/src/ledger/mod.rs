//! Double-entry ledger logic.
//!
//! This module implements the pure side of the ledger engine:
//! - Account, transaction, and entry types
//! - Amount and transfer validation
//! - Balance planning for deposits and transfers
//! - Balance reconstruction and entry-set checks
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use balance::{EntrySetError, balance_from_entries, validate_entry_set};
pub use error::{ErrorKind, LedgerError};
pub use types::{
    Account, Direction, Entry, HistoryItem, TRANSFER_DESCRIPTION, Transaction, TransactionKind,
    TransactionStatus,
};
pub use validation::{
    AccountSnapshot, BalanceChange, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT, history_limit,
    plan_deposit, plan_transfer, validate_amount, validate_owner_name, validate_transfer,
};
