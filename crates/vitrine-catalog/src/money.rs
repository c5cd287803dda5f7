//! Money type for listing prices.
//!
//! Uses an integer amount in the currency's smallest unit so that prices and
//! discounts compare exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    EUR,
    XOF,
    USD,
}

impl Currency {
    /// Get the currency code (e.g., "EUR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::XOF => "XOF",
            Currency::USD => "USD",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "\u{20ac}",
            Currency::XOF => "FCFA",
            Currency::USD => "$",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::XOF => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "EUR" => Some(Currency::EUR),
            "XOF" => Some(Currency::XOF),
            "USD" => Some(Currency::USD),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use vitrine_catalog::money::{Money, Currency};
    /// let price = Money::from_decimal(49.99, Currency::EUR);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        let amount_cents = (amount * multiplier as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.amount_cents as f64 / divisor as f64
    }

    /// Format as a display string (e.g., "49.99 €").
    pub fn display(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        format!("{:.places$} {}", self.to_decimal(), self.currency.symbol())
    }

    /// Amount saved relative to a higher reference price.
    ///
    /// Returns `None` when currencies differ or the reference is not higher.
    pub fn savings_from(&self, original: &Money) -> Option<Money> {
        if self.currency != original.currency || original.amount_cents <= self.amount_cents {
            return None;
        }
        Some(Money::new(
            original.amount_cents - self.amount_cents,
            self.currency,
        ))
    }

    /// Whole-number discount percentage relative to a higher reference price.
    ///
    /// Rounded to the nearest percent and clamped to 0-100.
    pub fn discount_percent_from(&self, original: &Money) -> u8 {
        match self.savings_from(original) {
            Some(saved) => {
                let percent = (saved.amount_cents as f64 / original.amount_cents as f64) * 100.0;
                percent.round().clamp(0.0, 100.0) as u8
            }
            None => 0,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        let m = Money::from_decimal(49.99, Currency::EUR);
        assert_eq!(m.amount_cents, 4999);

        let m = Money::from_decimal(15000.0, Currency::XOF);
        assert_eq!(m.amount_cents, 15000);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999, Currency::EUR).display(), "49.99 \u{20ac}");
        assert_eq!(Money::new(15000, Currency::XOF).display(), "15000 FCFA");
    }

    #[test]
    fn test_discount_percent() {
        let price = Money::new(6000, Currency::EUR);
        let original = Money::new(8000, Currency::EUR);
        assert_eq!(price.discount_percent_from(&original), 25);
        assert_eq!(price.savings_from(&original), Some(Money::new(2000, Currency::EUR)));
    }

    #[test]
    fn test_no_discount_when_original_not_higher() {
        let price = Money::new(8000, Currency::EUR);
        assert_eq!(price.discount_percent_from(&Money::new(8000, Currency::EUR)), 0);
        assert_eq!(price.discount_percent_from(&Money::new(9000, Currency::USD)), 0);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("eur"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("XOF"), Some(Currency::XOF));
        assert_eq!(Currency::from_code("JPY"), None);
    }
}
