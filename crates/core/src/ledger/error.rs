//! Ledger error types.
//!
//! Errors fall into classes that tell the caller whether a retry is safe:
//! validation failures are rejected before any unit of work opens, business
//! rule failures abort the unit cleanly, and infrastructure failures leave the
//! outcome unknown.

use paylane_shared::types::{AccountId, Currency};
use thiserror::Error;

/// Coarse error class used to pick the client-facing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, nothing was attempted.
    Validation,
    /// Referenced account does not exist.
    NotFound,
    /// Rule violated, unit of work aborted without effect.
    BusinessRule,
    /// Store failure, outcome unknown.
    Infrastructure,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(i64),

    /// Source and destination are the same account.
    #[error("Cannot transfer to the same account")]
    SameAccount,

    /// Owner name is blank.
    #[error("Owner name is required")]
    MissingOwnerName,

    /// Accounts hold different currencies.
    #[error("Currency mismatch: {from} account cannot pay into {to} account")]
    CurrencyMismatch {
        /// Source account currency.
        from: Currency,
        /// Destination account currency.
        to: Currency,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    // ========== Business Rule Errors ==========
    /// Source balance is lower than the requested amount.
    #[error("Insufficient funds: you have {have} but tried to send {want}")]
    InsufficientFunds {
        /// Balance at the time of the check.
        have: i64,
        /// Requested amount.
        want: i64,
    },

    /// Applying the amount would overflow the balance.
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(AccountId),
}

impl LedgerError {
    /// Returns the error class.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::SameAccount
            | Self::MissingOwnerName
            | Self::CurrencyMismatch { .. } => ErrorKind::Validation,
            Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientFunds { .. } | Self::BalanceOverflow(_) => ErrorKind::BusinessRule,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::MissingOwnerName => "MISSING_OWNER_NAME",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::BusinessRule => 422,
            ErrorKind::Infrastructure => 500,
        }
    }

    /// Returns true if the caller may retry. Ledger errors are definite
    /// outcomes, so only infrastructure failures qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Infrastructure)
    }
}
