//! Business rule validation for ledger operations.
//!
//! The store does the locking; these functions decide, from the values it read
//! under lock, whether a posting may proceed and what the new balances are.

use paylane_shared::types::{AccountId, Currency};

use super::error::LedgerError;
use super::types::Direction;

/// Number of history rows returned when the caller does not ask for a limit.
pub const DEFAULT_HISTORY_LIMIT: u64 = 10;

/// Largest history page a caller may request.
pub const MAX_HISTORY_LIMIT: u64 = 100;

/// Balance and currency of an account as read inside the unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Account identifier.
    pub id: AccountId,
    /// Balance in minor units.
    pub balance: i64,
    /// Account currency.
    pub currency: Currency,
}

/// One balance mutation and the entry that records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    /// Affected account.
    pub account_id: AccountId,
    /// Entry direction.
    pub direction: Direction,
    /// Entry amount (positive).
    pub amount: i64,
    /// Balance after the change.
    pub new_balance: i64,
}

/// Rejects zero and negative amounts.
pub fn validate_amount(amount: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

/// Checks transfer input before any unit of work opens.
pub fn validate_transfer(from: AccountId, to: AccountId, amount: i64) -> Result<(), LedgerError> {
    validate_amount(amount)?;
    if from == to {
        return Err(LedgerError::SameAccount);
    }
    Ok(())
}

/// Rejects a blank owner name.
pub fn validate_owner_name(owner_name: &str) -> Result<(), LedgerError> {
    if owner_name.trim().is_empty() {
        return Err(LedgerError::MissingOwnerName);
    }
    Ok(())
}

/// Clamps a requested history size into `1..=MAX_HISTORY_LIMIT`.
#[must_use]
pub fn history_limit(requested: Option<u64>) -> u64 {
    requested
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

/// Plans the single CREDIT of a deposit.
pub fn plan_deposit(account: AccountSnapshot, amount: i64) -> Result<BalanceChange, LedgerError> {
    validate_amount(amount)?;
    let new_balance = account
        .balance
        .checked_add(amount)
        .ok_or(LedgerError::BalanceOverflow(account.id))?;

    Ok(BalanceChange {
        account_id: account.id,
        direction: Direction::Credit,
        amount,
        new_balance,
    })
}

/// Plans the DEBIT/CREDIT pair of a transfer.
///
/// `source` must have been read under an exclusive lock held until commit,
/// otherwise the funds check is meaningless.
pub fn plan_transfer(
    source: AccountSnapshot,
    destination: AccountSnapshot,
    amount: i64,
) -> Result<[BalanceChange; 2], LedgerError> {
    validate_transfer(source.id, destination.id, amount)?;

    if source.currency != destination.currency {
        return Err(LedgerError::CurrencyMismatch {
            from: source.currency,
            to: destination.currency,
        });
    }

    if source.balance < amount {
        return Err(LedgerError::InsufficientFunds {
            have: source.balance,
            want: amount,
        });
    }

    let debit = BalanceChange {
        account_id: source.id,
        direction: Direction::Debit,
        amount,
        new_balance: source.balance - amount,
    };
    let credit = BalanceChange {
        account_id: destination.id,
        direction: Direction::Credit,
        amount,
        new_balance: destination
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(destination.id))?,
    };

    Ok([debit, credit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn snapshot(balance: i64) -> AccountSnapshot {
        AccountSnapshot {
            id: AccountId::new(),
            balance,
            currency: Currency::Tzs,
        }
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(i64::MIN)]
    fn test_non_positive_amount_rejected(#[case] amount: i64) {
        assert_eq!(validate_amount(amount), Err(LedgerError::InvalidAmount(amount)));
    }

    #[test]
    fn test_same_account_transfer_rejected() {
        let id = AccountId::new();
        assert_eq!(validate_transfer(id, id, 100), Err(LedgerError::SameAccount));
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(0), 1)]
    #[case(Some(25), 25)]
    #[case(Some(10_000), 100)]
    fn test_history_limit(#[case] requested: Option<u64>, #[case] expected: u64) {
        assert_eq!(history_limit(requested), expected);
    }

    #[test]
    fn test_owner_name_required() {
        assert_eq!(validate_owner_name("   "), Err(LedgerError::MissingOwnerName));
        assert!(validate_owner_name("Amina").is_ok());
    }

    #[test]
    fn test_deposit_into_empty_account() {
        let account = snapshot(0);
        let change = plan_deposit(account, 1000).unwrap();
        assert_eq!(change.direction, Direction::Credit);
        assert_eq!(change.amount, 1000);
        assert_eq!(change.new_balance, 1000);
    }

    #[test]
    fn test_transfer_exact_balance() {
        let x = snapshot(1000);
        let y = snapshot(0);
        let [debit, credit] = plan_transfer(x, y, 1000).unwrap();

        assert_eq!(debit.account_id, x.id);
        assert_eq!(debit.direction, Direction::Debit);
        assert_eq!(debit.new_balance, 0);
        assert_eq!(credit.account_id, y.id);
        assert_eq!(credit.direction, Direction::Credit);
        assert_eq!(credit.new_balance, 1000);
        assert_eq!(debit.amount, credit.amount);
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let x = snapshot(500);
        let y = snapshot(0);
        assert_eq!(
            plan_transfer(x, y, 1000),
            Err(LedgerError::InsufficientFunds {
                have: 500,
                want: 1000
            })
        );
    }

    #[test]
    fn test_transfer_currency_mismatch() {
        let x = snapshot(500);
        let y = AccountSnapshot {
            currency: Currency::Usd,
            ..snapshot(0)
        };
        assert!(matches!(
            plan_transfer(x, y, 100),
            Err(LedgerError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_deposit_overflow() {
        let account = snapshot(i64::MAX);
        assert_eq!(
            plan_deposit(account, 1),
            Err(LedgerError::BalanceOverflow(account.id))
        );
    }
}
