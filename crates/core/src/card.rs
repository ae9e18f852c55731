//! Card checks for charges.
//!
//! Only Visa and Mastercard numbers are accepted. A number must pass the Luhn
//! checksum and match the brand's prefix and length rules:
//! - Visa: starts with `4`, 13 or 16 digits
//! - Mastercard: starts with `51`..`55`, 16 digits

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest charge accepted, in minor units (500.00).
pub const MIN_CHARGE_AMOUNT: i64 = 50_000;

/// Accepted card networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardBrand {
    /// Visa.
    Visa,
    /// Mastercard.
    Mastercard,
}

impl CardBrand {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "VISA",
            Self::Mastercard => "MASTERCARD",
        }
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected charge input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    /// Number fails the checksum or is not Visa/Mastercard.
    #[error("Invalid card. We only accept Visa and Mastercard")]
    InvalidNumber,

    /// Expiry is not `MM/YY`.
    #[error("Invalid expiry, expected MM/YY")]
    InvalidExpiry,

    /// CVC shorter than three digits.
    #[error("Invalid CVC")]
    InvalidCvc,

    /// Amount under [`MIN_CHARGE_AMOUNT`].
    #[error("Amount too low: minimum is 50000 minor units, got {0}")]
    AmountTooLow(i64),
}

impl CardError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidNumber => "INVALID_CARD",
            Self::InvalidExpiry => "INVALID_EXPIRY",
            Self::InvalidCvc => "INVALID_CVC",
            Self::AmountTooLow(_) => "AMOUNT_TOO_LOW",
        }
    }
}

/// Validates a card number, ignoring spaces and dashes, and returns its brand.
pub fn validate_card(number: &str) -> Result<CardBrand, CardError> {
    let digits: String = number.chars().filter(|c| *c != ' ' && *c != '-').collect();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::InvalidNumber);
    }
    if !passes_luhn(&digits) {
        return Err(CardError::InvalidNumber);
    }

    let bytes = digits.as_bytes();
    match (bytes[0], bytes.get(1), bytes.len()) {
        (b'4', _, 13 | 16) => Ok(CardBrand::Visa),
        (b'5', Some(b'1'..=b'5'), 16) => Ok(CardBrand::Mastercard),
        _ => Err(CardError::InvalidNumber),
    }
}

/// Mod 10 checksum over ASCII digits.
fn passes_luhn(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let n = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = n * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                n
            }
        })
        .sum();
    sum % 10 == 0
}

/// Validates an expiry of the form `MM/YY` with a month in `01..=12`.
pub fn validate_expiry(expiry: &str) -> Result<(), CardError> {
    let Some((month, year)) = expiry.split_once('/') else {
        return Err(CardError::InvalidExpiry);
    };
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(month) || !two_digits(year) {
        return Err(CardError::InvalidExpiry);
    }
    match month.parse::<u8>() {
        Ok(1..=12) => Ok(()),
        _ => Err(CardError::InvalidExpiry),
    }
}

/// Validates a CVC of at least three digits.
pub fn validate_cvc(cvc: &str) -> Result<(), CardError> {
    if cvc.len() < 3 || !cvc.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::InvalidCvc);
    }
    Ok(())
}

/// Rejects charges below [`MIN_CHARGE_AMOUNT`].
pub const fn validate_charge_amount(amount: i64) -> Result<(), CardError> {
    if amount < MIN_CHARGE_AMOUNT {
        return Err(CardError::AmountTooLow(amount));
    }
    Ok(())
}
