//! Balance reconstruction from entries.
//!
//! An account's stored balance must always equal the sum of its CREDIT entries
//! minus the sum of its DEBIT entries. These helpers recompute that figure and
//! check the shape of a transaction's entry set, for audits and tests.

use paylane_shared::types::AccountId;
use thiserror::Error;

use super::types::{Direction, Entry, TransactionKind};

/// Entry set does not match the double-entry shape of its transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntrySetError {
    /// Wrong number of entries.
    #[error("Expected {expected} entries, found {found}")]
    WrongEntryCount {
        /// Entries required by the kind.
        expected: usize,
        /// Entries present.
        found: usize,
    },

    /// A deposit entry was not a credit.
    #[error("Deposit must be recorded as a single CREDIT entry")]
    DepositNotCredit,

    /// Transfer entries do not balance.
    #[error("Transfer entries must be one DEBIT and one CREDIT of equal amount")]
    Unbalanced,

    /// Entries reference different transactions.
    #[error("Entries belong to different transactions")]
    MixedTransactions,
}

/// Net balance of `account_id` implied by `entries`.
///
/// Entries for other accounts are ignored.
#[must_use]
pub fn balance_from_entries<'a, I>(account_id: AccountId, entries: I) -> i64
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .filter(|entry| entry.account_id == account_id)
        .map(|entry| entry.direction.signed(entry.amount))
        .sum()
}

/// Checks that `entries` form a valid set for a transaction of `kind`.
pub fn validate_entry_set(kind: TransactionKind, entries: &[Entry]) -> Result<(), EntrySetError> {
    if let Some(first) = entries.first() {
        if entries.iter().any(|e| e.transaction_id != first.transaction_id) {
            return Err(EntrySetError::MixedTransactions);
        }
    }

    match kind {
        TransactionKind::Deposit => {
            let [entry] = entries else {
                return Err(EntrySetError::WrongEntryCount {
                    expected: 1,
                    found: entries.len(),
                });
            };
            if entry.direction != Direction::Credit {
                return Err(EntrySetError::DepositNotCredit);
            }
        }
        TransactionKind::Transfer => {
            let [a, b] = entries else {
                return Err(EntrySetError::WrongEntryCount {
                    expected: 2,
                    found: entries.len(),
                });
            };
            if a.amount != b.amount || a.direction != b.direction.opposite() {
                return Err(EntrySetError::Unbalanced);
            }
        }
    }

    Ok(())
}
