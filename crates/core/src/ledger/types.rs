//! Ledger domain types.
//!
//! Accounts hold a running balance in minor units. Every change to a balance is
//! recorded as an immutable [`Entry`] that belongs to exactly one immutable
//! [`Transaction`].

use chrono::{DateTime, Utc};
use paylane_shared::types::{AccountId, Currency, EntryId, TransactionId};
use serde::{Deserialize, Serialize};

/// Direction of an entry against its account.
///
/// - `Credit` increases the account balance
/// - `Debit` decreases the account balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Money leaves the account.
    Debit,
    /// Money enters the account.
    Credit,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Signed effect of an entry of `amount` on the account balance.
    #[must_use]
    pub const fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

/// Transaction status.
///
/// Only `Completed` is produced today; the others are reserved for
/// asynchronous settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Awaiting settlement.
    Pending,
    /// Settled and immutable.
    Completed,
    /// Settlement failed.
    Failed,
}

impl TransactionStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

/// What kind of movement a transaction records.
///
/// Determines the shape of its entry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// External inflow: exactly one CREDIT entry.
    Deposit,
    /// Internal movement: one DEBIT and one CREDIT of equal amount.
    Transfer,
}

/// Description stamped on every transfer transaction.
pub const TRANSFER_DESCRIPTION: &str = "P2P Transfer";

/// A wallet or merchant vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: AccountId,
    /// Owner display name.
    pub owner_name: String,
    /// Balance in minor units.
    pub balance: i64,
    /// Account currency.
    pub currency: Currency,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// An immutable record of a money movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Amount in minor units (always positive).
    pub amount: i64,
    /// Currency of the movement.
    pub currency: Currency,
    /// Human-readable description.
    pub description: String,
    /// Settlement status.
    pub status: TransactionStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// One side of a transaction against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry identifier.
    pub id: EntryId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Affected account.
    pub account_id: AccountId,
    /// Whether the entry adds to or removes from the balance.
    pub direction: Direction,
    /// Amount in minor units (always positive).
    pub amount: i64,
}

/// A transaction as seen from one account's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// The transaction.
    pub transaction: Transaction,
    /// Direction of this account's entry in it.
    pub direction: Direction,
}
