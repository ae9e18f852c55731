//! Property-based tests for ledger posting rules.
//!
//! Drives random sequences of deposits and transfers through the planning
//! functions against an in-memory book and checks the ledger invariants:
//! - balance always equals credits minus debits
//! - no transfer ever takes a balance below zero
//! - every recorded transaction has a valid entry set

use proptest::prelude::*;
use paylane_shared::types::{AccountId, Currency, EntryId, TransactionId};

use super::balance::{balance_from_entries, validate_entry_set};
use super::error::LedgerError;
use super::types::{Entry, TransactionKind};
use super::validation::{AccountSnapshot, BalanceChange, plan_deposit, plan_transfer};

const ACCOUNTS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Deposit { account: usize, amount: i64 },
    Transfer { from: usize, to: usize, amount: i64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, 1i64..100_000).prop_map(|(account, amount)| Op::Deposit { account, amount }),
        (0..ACCOUNTS, 0..ACCOUNTS, -10i64..100_000)
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
    ]
}

/// Minimal in-memory book that applies planned changes all-or-nothing.
struct Book {
    accounts: Vec<AccountSnapshot>,
    entries: Vec<Entry>,
    transactions: Vec<(TransactionKind, TransactionId)>,
}

impl Book {
    fn new() -> Self {
        Self {
            accounts: (0..ACCOUNTS)
                .map(|_| AccountSnapshot {
                    id: AccountId::new(),
                    balance: 0,
                    currency: Currency::Tzs,
                })
                .collect(),
            entries: Vec::new(),
            transactions: Vec::new(),
        }
    }

    fn commit(&mut self, kind: TransactionKind, changes: &[BalanceChange]) {
        let transaction_id = TransactionId::new();
        for change in changes {
            let account = self
                .accounts
                .iter_mut()
                .find(|a| a.id == change.account_id)
                .unwrap();
            account.balance = change.new_balance;
            self.entries.push(Entry {
                id: EntryId::new(),
                transaction_id,
                account_id: change.account_id,
                direction: change.direction,
                amount: change.amount,
            });
        }
        self.transactions.push((kind, transaction_id));
    }

    fn apply(&mut self, op: &Op) -> Result<(), LedgerError> {
        match *op {
            Op::Deposit { account, amount } => {
                let change = plan_deposit(self.accounts[account], amount)?;
                self.commit(TransactionKind::Deposit, &[change]);
            }
            Op::Transfer { from, to, amount } => {
                let changes = plan_transfer(self.accounts[from], self.accounts[to], amount)?;
                self.commit(TransactionKind::Transfer, &changes);
            }
        }
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* sequence of operations, every account balance equals the sum
    /// of its credit entries minus its debit entries, and never goes negative.
    #[test]
    fn prop_balance_matches_entries(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut book = Book::new();

        for op in &ops {
            let before: Vec<i64> = book.accounts.iter().map(|a| a.balance).collect();
            let entries_before = book.entries.len();

            if book.apply(op).is_err() {
                // Rejected operations leave no trace.
                let after: Vec<i64> = book.accounts.iter().map(|a| a.balance).collect();
                prop_assert_eq!(before, after);
                prop_assert_eq!(entries_before, book.entries.len());
            }

            for account in &book.accounts {
                prop_assert!(account.balance >= 0);
                prop_assert_eq!(account.balance, balance_from_entries(account.id, &book.entries));
            }
        }
    }

    /// *For any* accepted operation, the recorded entries match the
    /// double-entry shape of its kind.
    #[test]
    fn prop_entry_sets_are_well_formed(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut book = Book::new();
        for op in &ops {
            let _ = book.apply(op);
        }

        for (kind, transaction_id) in &book.transactions {
            let entries: Vec<Entry> = book
                .entries
                .iter()
                .filter(|e| e.transaction_id == *transaction_id)
                .cloned()
                .collect();
            prop_assert!(validate_entry_set(*kind, &entries).is_ok());
        }
    }

    /// *For any* balance, concurrent-style transfers whose amounts sum to the
    /// balance all succeed when serialized, and one more unit fails.
    #[test]
    fn prop_serialized_transfers_exhaust_balance(parts in prop::collection::vec(1i64..1_000, 1..20)) {
        let mut book = Book::new();
        let total: i64 = parts.iter().sum();
        book.apply(&Op::Deposit { account: 0, amount: total }).unwrap();

        for amount in &parts {
            let posted = book.apply(&Op::Transfer { from: 0, to: 1, amount: *amount });
            prop_assert!(posted.is_ok());
        }
        prop_assert_eq!(book.accounts[0].balance, 0);
        let overdraw = book.apply(&Op::Transfer { from: 0, to: 1, amount: 1 });
        prop_assert_eq!(overdraw, Err(LedgerError::InsufficientFunds { have: 0, want: 1 }));
    }
}
