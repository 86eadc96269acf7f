//! Currency and amount value types.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! `Amount` wraps `rust_decimal::Decimal` and is always stored already
//! truncated to its currency's scale.

use std::fmt;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{MoneyError, MoneyResult};
use crate::math::Math;

/// A currency identifier paired with its scale (decimal places).
///
/// Equality and hashing use the identifier only.
#[derive(Debug, Clone, Serialize)]
pub struct Currency {
    identifier: String,
    scale: u32,
}

impl Currency {
    /// Creates a currency. The identifier is trimmed and upper-cased.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_shared::Currency;
    ///
    /// let usd = Currency::new("usd", 2).unwrap();
    /// assert_eq!(usd.identifier(), "USD");
    /// assert!(Currency::new("  ", 2).is_err());
    /// ```
    pub fn new(identifier: impl AsRef<str>, scale: u32) -> MoneyResult<Self> {
        let identifier = identifier.as_ref().trim().to_uppercase();
        if identifier.is_empty() {
            return Err(MoneyError::EmptyIdentifier);
        }

        Ok(Self {
            identifier,
            scale: Math::check_scale(scale)?,
        })
    }

    /// Creates a currency from a signed scale, e.g. one read from configuration.
    pub fn with_signed_scale(identifier: impl AsRef<str>, scale: i64) -> MoneyResult<Self> {
        Self::new(identifier, Math::checked_scale(scale)?)
    }

    /// Returns the currency identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the number of decimal places.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

impl std::str::FromStr for Currency {
    type Err = MoneyError;

    /// Resolves an ISO 4217 code from the built-in catalogue.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        let scale = match code.as_str() {
            "USD" | "EUR" | "SGD" | "IDR" => 2,
            "JPY" => 0,
            _ => return Err(MoneyError::UnknownCurrency(s.to_string())),
        };
        Self::new(code, scale)
    }
}

/// A monetary amount in a specific currency.
#[derive(Debug, Clone, Serialize)]
pub struct Amount {
    value: Decimal,
    currency: Currency,
}

impl Amount {
    /// Parses a decimal string and truncates it to the currency's scale.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_shared::{Amount, Currency};
    ///
    /// let usd = Currency::new("USD", 2).unwrap();
    /// let amount = Amount::new("103.2", usd).unwrap();
    /// assert_eq!(amount.to_string(), "103.20");
    /// ```
    pub fn new(value: &str, currency: Currency) -> MoneyResult<Self> {
        Ok(Self::from_decimal(Math::parse_to_scale(value, currency.scale())?, currency))
    }

    /// Wraps a decimal value, truncating it to the currency's scale.
    #[must_use]
    pub fn from_decimal(value: Decimal, currency: Currency) -> Self {
        Self {
            value: Math::truncate(value, currency.scale()),
            currency,
        }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::from_decimal(Decimal::ZERO, currency)
    }

    /// Returns the decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the currency.
    #[must_use]
    pub const fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.value.is_sign_positive() && !self.value.is_zero()
    }

    /// Returns a new amount in the same currency.
    #[must_use]
    pub fn with_value(&self, value: Decimal) -> Self {
        Self::from_decimal(value, self.currency.clone())
    }

    /// Truncates the value to at most `scale` decimal places.
    ///
    /// The result keeps the currency's scale for presentation, so a scale
    /// above the currency's is a no-op.
    #[must_use]
    pub fn truncate_to(&self, scale: u32) -> Self {
        self.with_value(Math::truncate(self.value, scale))
    }

    /// Re-expresses the amount in a currency with the same identifier and a
    /// different scale, truncating if the new scale is smaller.
    pub fn rescaled(&self, scale: u32) -> MoneyResult<Self> {
        let currency = Currency::new(self.currency.identifier(), scale)?;
        Ok(Self::from_decimal(self.value, currency))
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(&self, other: &Self) -> MoneyResult<Self> {
        self.ensure_same_currency(other, "addition")?;
        let sum = Math::add_decimal(self.value, other.value, self.currency.scale())?;
        Ok(self.with_value(sum))
    }

    /// Subtracts an amount of the same currency.
    pub fn checked_sub(&self, other: &Self) -> MoneyResult<Self> {
        self.ensure_same_currency(other, "subtraction")?;
        let difference = Math::subtract_decimal(self.value, other.value, self.currency.scale())?;
        Ok(self.with_value(difference))
    }

    fn ensure_same_currency(&self, other: &Self, operation: &'static str) -> MoneyResult<()> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.to_string(),
                right: other.currency.to_string(),
                operation,
            });
        }
        Ok(())
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.currency == other.currency && self.value == other.value
    }
}

impl Eq for Amount {}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
