//! Decimal arithmetic core.
//!
//! CRITICAL: Never use floating-point for money calculations.
//!
//! Every operation accepts decimal strings (or `Decimal` values) together with
//! a target scale and returns a result reduced to that scale. Reduction
//! truncates toward zero: digits beyond the scale are dropped, never rounded
//! up. Multi-step derivations run at [`DEFAULT_SCALE`] so that only the value
//! finally presented to a caller is reduced to the currency or strategy scale.

use std::cmp::Ordering;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{MoneyError, MoneyResult};

#[cfg(test)]
mod props;

/// High-precision scale used for intermediate results.
pub const DEFAULT_SCALE: u32 = 20;

/// Largest scale the decimal backend can represent.
pub const MAX_SCALE: u32 = 28;

/// Decimal arithmetic over base-10 strings.
///
/// The string API mirrors the typed `*_decimal` helpers, which the fee
/// strategies use directly to avoid re-parsing intermediate values.
pub struct Math;

impl Math {
    /// Parses a decimal string.
    ///
    /// Surrounding whitespace and a single leading `+` are stripped, leading
    /// zeros are tolerated. Anything else must match `-?\d+(\.\d+)?`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use feecalc_shared::Math;
    ///
    /// assert_eq!(Math::parse("+007.50").unwrap(), dec!(7.5));
    /// assert!(Math::parse("1e3").is_err());
    /// ```
    ///
    /// Insignificant trailing fractional zeros are ignored, so only the
    /// significant digits have to fit the decimal backend.
    pub fn parse(value: &str) -> MoneyResult<Decimal> {
        let digits = sanitize(value)?;
        from_digits(without_trailing_zeros(digits), value)
    }

    /// Validates a scale coming from an unsigned source.
    pub fn check_scale(scale: u32) -> MoneyResult<u32> {
        if scale > MAX_SCALE {
            return Err(MoneyError::InvalidScale(i64::from(scale)));
        }
        Ok(scale)
    }

    /// Validates a scale coming from a signed source such as configuration.
    pub fn checked_scale(scale: i64) -> MoneyResult<u32> {
        if scale < 0 {
            return Err(MoneyError::NegativeScale(scale));
        }
        u32::try_from(scale)
            .map_err(|_| MoneyError::InvalidScale(scale))
            .and_then(Self::check_scale)
    }

    /// Truncates a value toward zero at `scale` decimal places.
    ///
    /// The result always carries exactly `scale` fractional digits and never
    /// a negative zero.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use feecalc_shared::Math;
    ///
    /// assert_eq!(Math::truncate(dec!(7.56595), 2), dec!(7.56));
    /// assert_eq!(Math::truncate(dec!(-1.019), 2), dec!(-1.01));
    /// ```
    #[must_use]
    pub fn truncate(value: Decimal, scale: u32) -> Decimal {
        let scale = scale.min(MAX_SCALE);
        let mut truncated = value.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
        truncated.rescale(scale);
        if truncated.is_zero() {
            truncated.set_sign_positive(true);
        }
        truncated
    }

    /// Formats a value with exactly `scale` fractional digits.
    #[must_use]
    pub fn format(value: Decimal, scale: u32) -> String {
        Self::truncate(value, scale).to_string()
    }

    /// Normalizes a decimal string to `scale` decimal places.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_shared::Math;
    ///
    /// assert_eq!(Math::normalize("12.3", 2).unwrap(), "12.30");
    /// assert_eq!(Math::normalize("0012.349", 2).unwrap(), "12.34");
    /// ```
    ///
    /// Digits beyond `scale` are cut from the text before it is parsed, so
    /// inputs longer than the decimal backend can hold still normalize.
    pub fn normalize(value: &str, scale: u32) -> MoneyResult<String> {
        Ok(Self::parse_to_scale(value, scale)?.to_string())
    }

    /// Parses a decimal string truncated to `scale` decimal places.
    pub fn parse_to_scale(value: &str, scale: u32) -> MoneyResult<Decimal> {
        let scale = Self::check_scale(scale)?;
        let digits = sanitize(value)?;
        let kept = without_trailing_zeros(cut_fraction(digits, scale));
        Ok(Self::truncate(from_digits(kept, value)?, scale))
    }

    /// Normalizes a decimal string, failing if that would change its value.
    ///
    /// Trailing zeros beyond `scale` are insignificant and never a loss.
    pub fn enforce_scale(value: &str, scale: u32) -> MoneyResult<String> {
        let scale = Self::check_scale(scale)?;
        let significant = without_trailing_zeros(sanitize(value)?);

        if fraction_len(significant) > scale as usize {
            return Err(MoneyError::PrecisionLoss {
                value: value.trim().to_string(),
                scale,
            });
        }

        Ok(Self::format(from_digits(significant, value)?, scale))
    }

    /// Compares two decimal strings numerically.
    pub fn compare(left: &str, right: &str) -> MoneyResult<Ordering> {
        Ok(Self::parse(left)?.cmp(&Self::parse(right)?))
    }

    /// Adds two decimal strings.
    pub fn add(left: &str, right: &str, scale: u32) -> MoneyResult<String> {
        let sum = Self::add_decimal(Self::parse(left)?, Self::parse(right)?, Self::check_scale(scale)?)?;
        Ok(sum.to_string())
    }

    /// Subtracts `right` from `left`.
    pub fn subtract(left: &str, right: &str, scale: u32) -> MoneyResult<String> {
        let difference =
            Self::subtract_decimal(Self::parse(left)?, Self::parse(right)?, Self::check_scale(scale)?)?;
        Ok(difference.to_string())
    }

    /// Multiplies two decimal strings.
    pub fn multiply(left: &str, right: &str, scale: u32) -> MoneyResult<String> {
        let product =
            Self::multiply_decimal(Self::parse(left)?, Self::parse(right)?, Self::check_scale(scale)?)?;
        Ok(product.to_string())
    }

    /// Divides `left` by `right`.
    pub fn divide(left: &str, right: &str, scale: u32) -> MoneyResult<String> {
        let quotient =
            Self::divide_decimal(Self::parse(left)?, Self::parse(right)?, Self::check_scale(scale)?)?;
        Ok(quotient.to_string())
    }

    /// Applies a percentage in decimal format (`"0.155"` is 15.5%) to an amount.
    ///
    /// The amount keeps its own scale; only the product is reduced to `scale`.
    pub fn apply_percentage(amount: &str, percentage: &str, scale: u32) -> MoneyResult<String> {
        let applied = Self::apply_percentage_decimal(
            Self::parse(amount)?,
            Self::parse(percentage)?,
            Self::check_scale(scale)?,
        )?;
        Ok(applied.to_string())
    }

    /// Calculates `1 + percentage`.
    pub fn one_plus_percentage(percentage: &str, scale: u32) -> MoneyResult<String> {
        let value = Self::one_plus_percentage_decimal(Self::parse(percentage)?, Self::check_scale(scale)?)?;
        Ok(value.to_string())
    }

    /// Calculates the backward multiplier `1 / (1 + percentage)`.
    pub fn backward_multiplier(percentage: &str, scale: u32) -> MoneyResult<String> {
        let value = Self::backward_multiplier_decimal(Self::parse(percentage)?, Self::check_scale(scale)?)?;
        Ok(value.to_string())
    }

    /// Typed addition.
    pub fn add_decimal(left: Decimal, right: Decimal, scale: u32) -> MoneyResult<Decimal> {
        left.checked_add(right)
            .map(|sum| Self::truncate(sum, scale))
            .ok_or_else(|| MoneyError::DecimalOverflow(format!("{left} + {right}")))
    }

    /// Typed subtraction.
    pub fn subtract_decimal(left: Decimal, right: Decimal, scale: u32) -> MoneyResult<Decimal> {
        left.checked_sub(right)
            .map(|difference| Self::truncate(difference, scale))
            .ok_or_else(|| MoneyError::DecimalOverflow(format!("{left} - {right}")))
    }

    /// Typed multiplication.
    pub fn multiply_decimal(left: Decimal, right: Decimal, scale: u32) -> MoneyResult<Decimal> {
        left.checked_mul(right)
            .map(|product| Self::truncate(product, scale))
            .ok_or_else(|| MoneyError::DecimalOverflow(format!("{left} * {right}")))
    }

    /// Typed division.
    pub fn divide_decimal(left: Decimal, right: Decimal, scale: u32) -> MoneyResult<Decimal> {
        if right.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        left.checked_div(right)
            .map(|quotient| Self::truncate(quotient, scale))
            .ok_or_else(|| MoneyError::DecimalOverflow(format!("{left} / {right}")))
    }

    /// Typed percentage application.
    pub fn apply_percentage_decimal(amount: Decimal, percentage: Decimal, scale: u32) -> MoneyResult<Decimal> {
        Self::multiply_decimal(amount, percentage, scale)
    }

    /// Typed `1 + percentage`.
    pub fn one_plus_percentage_decimal(percentage: Decimal, scale: u32) -> MoneyResult<Decimal> {
        Self::add_decimal(Decimal::ONE, percentage, scale)
    }

    /// Typed `1 / (1 + percentage)`.
    pub fn backward_multiplier_decimal(percentage: Decimal, scale: u32) -> MoneyResult<Decimal> {
        let one_plus = Self::one_plus_percentage_decimal(percentage, scale)?;
        Self::divide_decimal(Decimal::ONE, one_plus, scale)
    }
}

/// Trims, strips a leading `+`, and validates the decimal shape.
fn sanitize(value: &str) -> MoneyResult<&str> {
    let trimmed = value.trim();
    let unsigned = match trimmed.strip_prefix('+') {
        Some(rest) if rest.starts_with('-') => {
            return Err(MoneyError::NotDecimalString(value.to_string()));
        }
        Some(rest) => rest,
        None => trimmed,
    };

    if !is_decimal_string(unsigned) {
        return Err(MoneyError::NotDecimalString(value.to_string()));
    }
    Ok(unsigned)
}

/// Drops zeros at the end of the fraction, and the point if nothing is left.
fn without_trailing_zeros(digits: &str) -> &str {
    match digits.split_once('.') {
        Some((integral, fractional)) if fractional.trim_end_matches('0').is_empty() => integral,
        Some(_) => digits.trim_end_matches('0'),
        None => digits,
    }
}

/// Keeps at most `scale` fractional digits.
fn cut_fraction(digits: &str, scale: u32) -> &str {
    match digits.split_once('.') {
        Some((integral, fractional)) if fractional.len() > scale as usize => {
            if scale == 0 {
                integral
            } else {
                &digits[..=integral.len() + scale as usize]
            }
        }
        _ => digits,
    }
}

fn fraction_len(digits: &str) -> usize {
    digits.split_once('.').map_or(0, |(_, fractional)| fractional.len())
}

fn from_digits(digits: &str, original: &str) -> MoneyResult<Decimal> {
    Decimal::from_str_exact(digits).map_err(|_| MoneyError::DecimalOverflow(original.to_string()))
}

fn is_decimal_string(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    match digits.split_once('.') {
        Some((integral, fractional)) => all_digits(integral) && all_digits(fractional),
        None => all_digits(digits),
    }
}
