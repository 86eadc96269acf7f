//! Applies a [`Fee`] directly to an amount, without a named strategy.

use feecalc_shared::math::DEFAULT_SCALE;
use feecalc_shared::{Amount, Math};

use super::types::Fee;
use crate::error::{FeeError, FeeResult};
use crate::strategy::CalculationDirection;

/// Stateless fee calculator.
///
/// Forward: `amount + amount * percent + fixed`.
/// Backward: `(amount - fixed) / (1 + percent)`.
///
/// Intermediate values are truncated at [`DEFAULT_SCALE`]; only the returned
/// amount is reduced to the currency scale.
pub struct FeeCalculator;

impl FeeCalculator {
    /// Runs the calculation in the given direction.
    pub fn calculate(amount: &Amount, fee: &Fee, direction: CalculationDirection) -> FeeResult<Amount> {
        match direction {
            CalculationDirection::Forward => Self::calculate_forward(amount, fee),
            CalculationDirection::Backward => Self::calculate_backward(amount, fee),
        }
    }

    /// Returns the total a customer pays for `amount`.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_core::{Fee, FeeCalculator};
    /// use feecalc_shared::{Amount, Currency};
    ///
    /// let usd = Currency::new("USD", 2).unwrap();
    /// let fee = Fee::new("0.029", Some(Amount::new("0.30", usd.clone()).unwrap())).unwrap();
    /// let total = FeeCalculator::calculate_forward(&Amount::new("100", usd).unwrap(), &fee).unwrap();
    /// assert_eq!(total.to_string(), "103.20");
    /// ```
    pub fn calculate_forward(amount: &Amount, fee: &Fee) -> FeeResult<Amount> {
        ensure_positive(amount)?;
        ensure_fixed_currency(amount, fee)?;

        let percentage = Math::apply_percentage_decimal(amount.value(), fee.percent(), DEFAULT_SCALE)?;
        let with_percentage = Math::add_decimal(amount.value(), percentage, DEFAULT_SCALE)?;
        let total = Math::add_decimal(with_percentage, fee.fixed_value(), DEFAULT_SCALE)?;

        Ok(amount.with_value(total))
    }

    /// Returns the base amount that produced the total `amount`.
    pub fn calculate_backward(amount: &Amount, fee: &Fee) -> FeeResult<Amount> {
        ensure_positive(amount)?;
        ensure_fixed_currency(amount, fee)?;

        let without_fixed = Math::subtract_decimal(amount.value(), fee.fixed_value(), DEFAULT_SCALE)?;
        let divisor = Math::one_plus_percentage_decimal(fee.percent(), DEFAULT_SCALE)?;
        let base = Math::divide_decimal(without_fixed, divisor, DEFAULT_SCALE)?;

        Ok(amount.with_value(base))
    }
}

fn ensure_positive(amount: &Amount) -> FeeResult<()> {
    if !amount.is_positive() {
        return Err(FeeError::AmountNotPositive {
            amount: amount.to_string(),
            currency: amount.currency().to_string(),
        });
    }
    Ok(())
}

fn ensure_fixed_currency(amount: &Amount, fee: &Fee) -> FeeResult<()> {
    if let Some(fixed) = fee.fixed() {
        // Surfaces CurrencyMismatch; the sum itself is discarded.
        amount.checked_add(fixed)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feecalc_shared::{Currency, MoneyError};
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD", 2).unwrap()
    }

    fn stripe_fee() -> Fee {
        Fee::new("0.029", Some(Amount::new("0.30", usd()).unwrap())).unwrap()
    }

    #[test]
    fn test_forward() {
        let total = FeeCalculator::calculate_forward(&Amount::new("100", usd()).unwrap(), &stripe_fee()).unwrap();
        assert_eq!(total.value(), dec!(103.20));
    }

    #[test]
    fn test_backward() {
        let base = FeeCalculator::calculate_backward(&Amount::new("103.20", usd()).unwrap(), &stripe_fee()).unwrap();
        assert_eq!(base.to_string(), "100.00");
    }

    #[test]
    fn test_truncates_toward_zero() {
        let amount = Amount::new("250.55", usd()).unwrap();
        let total = FeeCalculator::calculate_forward(&amount, &stripe_fee()).unwrap();
        assert_eq!(total.to_string(), "258.11");

        // 258.11 - 0.30 = 257.81, and 257.81 / 1.029 = 250.5442...
        let base = FeeCalculator::calculate_backward(&total, &stripe_fee()).unwrap();
        assert_eq!(base.to_string(), "250.54");
    }

    #[test]
    fn test_backward_divides_instead_of_multiplying_by_the_inverse() {
        let fee = Fee::new("0.029", None).unwrap();
        let base = FeeCalculator::calculate_backward(&Amount::new("102.90", usd()).unwrap(), &fee).unwrap();
        assert_eq!(base.to_string(), "100.00");
    }

    #[test]
    fn test_percentage_only() {
        let fee = Fee::new("0.1", None).unwrap();
        let amount = Amount::new("50", usd()).unwrap();

        let total = FeeCalculator::calculate(&amount, &fee, CalculationDirection::Forward).unwrap();
        assert_eq!(total.value(), dec!(55));

        let base = FeeCalculator::calculate(&total, &fee, CalculationDirection::Backward).unwrap();
        assert_eq!(base.value(), dec!(50));
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        for value in ["0", "-5"] {
            let amount = Amount::new(value, usd()).unwrap();
            assert!(matches!(
                FeeCalculator::calculate_forward(&amount, &stripe_fee()),
                Err(FeeError::AmountNotPositive { .. })
            ));
            assert!(matches!(
                FeeCalculator::calculate_backward(&amount, &stripe_fee()),
                Err(FeeError::AmountNotPositive { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_fixed_in_other_currency() {
        let eur = Currency::new("EUR", 2).unwrap();
        let amount = Amount::new("100", eur).unwrap();

        assert_eq!(
            FeeCalculator::calculate_forward(&amount, &stripe_fee()),
            Err(FeeError::Money(MoneyError::CurrencyMismatch {
                left: "EUR".into(),
                right: "USD".into(),
                operation: "addition"
            }))
        );
    }

    #[test]
    fn test_zero_scale_currency() {
        let jpy = Currency::new("JPY", 0).unwrap();
        let fee = Fee::new("0.035", None).unwrap();
        let total = FeeCalculator::calculate_forward(&Amount::new("1000", jpy).unwrap(), &fee).unwrap();
        assert_eq!(total.to_string(), "1035");
    }
}
