//! Monetary amounts as decimal strings with currency codes.
//!
//! Shopify returns money as `{amount, currencyCode}` with the amount encoded
//! as a decimal string. Amounts stay strings at the edges (preserving exactly
//! what the API sent) and are parsed into [`rust_decimal::Decimal`] only at
//! the point arithmetic is needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Create a money value from an amount string and currency code.
    #[must_use]
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new("0", currency_code)
    }

    /// Build a money value from a computed decimal amount.
    #[must_use]
    pub fn from_decimal(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self::new(amount.normalize().to_string(), currency_code)
    }

    /// Parse the amount into a decimal.
    ///
    /// An unparseable amount is treated as zero rather than an error; cart
    /// arithmetic over the previous in-memory state must never fail.
    #[must_use]
    pub fn decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or_default()
    }

    /// Whether the amount parses to exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.decimal() == Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        let money = Money::new("1990.50", "CLP");
        assert_eq!(money.decimal(), "1990.50".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn unparseable_amount_is_zero() {
        let money = Money::new("not-a-number", "CLP");
        assert_eq!(money.decimal(), Decimal::ZERO);
        assert!(money.is_zero());
    }

    #[test]
    fn from_decimal_normalizes_trailing_zeros() {
        let amount = "2000.00".parse::<Decimal>().expect("decimal");
        let money = Money::from_decimal(amount, "CLP");
        assert_eq!(money.amount, "2000");
    }

    #[test]
    fn zero_helper() {
        let money = Money::zero("USD");
        assert!(money.is_zero());
        assert_eq!(money.currency_code, "USD");
    }

    #[test]
    fn serde_round_trip() {
        let money = Money::new("1000", "CLP");
        let json = serde_json::to_string(&money).expect("serialize");
        let back: Money = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, money);
    }
}
