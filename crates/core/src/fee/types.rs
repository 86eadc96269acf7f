//! Percentage + fixed surcharge fee description.

use feecalc_shared::{Amount, Math};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{FeeError, FeeResult};

/// Parses a percentage given as a decimal fraction ("0.155" = 15.5%).
///
/// # Errors
///
/// Returns `InvalidPercentage` if the value is malformed or outside [0, 1].
pub fn parse_percentage(value: &str) -> FeeResult<Decimal> {
    let percent = Math::parse(value).map_err(|_| FeeError::InvalidPercentage(value.trim().to_string()))?;
    check_percentage(percent)
}

fn check_percentage(percent: Decimal) -> FeeResult<Decimal> {
    if percent < Decimal::ZERO || percent > Decimal::ONE {
        return Err(FeeError::InvalidPercentage(percent.to_string()));
    }
    Ok(percent)
}

/// A percentage rate plus an optional fixed surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fee {
    percent: Decimal,
    fixed: Option<Amount>,
}

impl Fee {
    /// Creates a fee from a percentage string.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_core::Fee;
    /// use feecalc_shared::{Amount, Currency};
    ///
    /// let usd = Currency::new("USD", 2).unwrap();
    /// let fee = Fee::new("0.029", Some(Amount::new("0.30", usd).unwrap())).unwrap();
    /// assert_eq!(fee.percent().to_string(), "0.029");
    /// assert!(Fee::new("1.5", None).is_err());
    /// ```
    pub fn new(percent: &str, fixed: Option<Amount>) -> FeeResult<Self> {
        Self::from_decimal(parse_percentage(percent)?, fixed)
    }

    /// Creates a fee from an already parsed percentage.
    pub fn from_decimal(percent: Decimal, fixed: Option<Amount>) -> FeeResult<Self> {
        let percent = check_percentage(percent)?;
        if let Some(amount) = &fixed
            && amount.is_negative()
        {
            return Err(FeeError::AmountNotPositive {
                amount: amount.to_string(),
                currency: amount.currency().to_string(),
            });
        }

        Ok(Self { percent, fixed })
    }

    /// Returns the percentage rate.
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.percent
    }

    /// Returns the fixed surcharge, if any.
    #[must_use]
    pub const fn fixed(&self) -> Option<&Amount> {
        self.fixed.as_ref()
    }

    /// Returns the fixed surcharge value, zero when absent.
    #[must_use]
    pub fn fixed_value(&self) -> Decimal {
        self.fixed.as_ref().map_or(Decimal::ZERO, Amount::value)
    }
}
