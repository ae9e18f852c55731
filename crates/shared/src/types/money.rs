//! Currencies and amounts in integer minor units.
//!
//! CRITICAL: Never use floating-point for money.
//! Amounts are `i64` counts of the smallest currency unit (e.g. cents);
//! `Decimal` only appears when rendering a human-readable major-unit amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Tanzanian Shilling
    Tzs,
}

impl Currency {
    /// Number of decimal places between the major and minor unit.
    #[must_use]
    pub const fn minor_unit_exponent(self) -> u32 {
        match self {
            Self::Usd | Self::Tzs => 2,
        }
    }

    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Tzs => "TZS",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "TZS" => Ok(Self::Tzs),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// An amount tagged with its currency, for display.
///
/// Renders in major units: `Money::new(1050, Currency::Usd)` prints `10.50 USD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Returns the amount in major units (e.g. `1050` cents -> `10.50`).
    #[must_use]
    pub fn to_major_units(&self) -> Decimal {
        Decimal::new(self.amount, self.currency.minor_unit_exponent())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_major_units(), self.currency)
    }
}
