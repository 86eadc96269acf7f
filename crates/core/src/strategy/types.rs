//! Request and result types shared by every fee strategy.

use std::fmt;

use feecalc_shared::{Amount, Currency, MoneyError};
use serde::Serialize;

use super::strategy_name;
use crate::context::Context;
use crate::error::{FeeError, FeeResult};

/// Direction of a fee calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationDirection {
    /// Base amount in, fee and total out.
    Forward,
    /// Total amount in, base and fee out.
    Backward,
}

impl CalculationDirection {
    /// Returns the lowercase direction name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl fmt::Display for CalculationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to run one named strategy over one amount.
///
/// Requests are immutable; `with_amount` and `with_context` return copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationRequest {
    strategy: String,
    direction: CalculationDirection,
    amount: Amount,
    context: Context,
}

impl CalculationRequest {
    /// Creates a request. The strategy name is trimmed and must not be empty.
    pub fn new(
        strategy: impl AsRef<str>,
        direction: CalculationDirection,
        amount: Amount,
        context: Context,
    ) -> FeeResult<Self> {
        Ok(Self {
            strategy: strategy_name(strategy)?,
            direction,
            amount,
            context,
        })
    }

    /// Creates a forward request.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_core::{CalculationRequest, Context};
    /// use feecalc_shared::{Amount, Currency};
    ///
    /// let usd: Currency = "USD".parse().unwrap();
    /// let amount = Amount::new("100", usd).unwrap();
    /// let request = CalculationRequest::forward(" stripe.standard_card ", amount, Context::new()).unwrap();
    /// assert_eq!(request.strategy(), "stripe.standard_card");
    /// ```
    pub fn forward(strategy: impl AsRef<str>, amount: Amount, context: Context) -> FeeResult<Self> {
        Self::new(strategy, CalculationDirection::Forward, amount, context)
    }

    /// Creates a backward request.
    pub fn backward(strategy: impl AsRef<str>, amount: Amount, context: Context) -> FeeResult<Self> {
        Self::new(strategy, CalculationDirection::Backward, amount, context)
    }

    /// Creates a forward request from a decimal string.
    ///
    /// A malformed amount is reported as `InvalidAmountFormat`.
    pub fn forward_from_str(
        strategy: impl AsRef<str>,
        amount: &str,
        currency: Currency,
        context: Context,
    ) -> FeeResult<Self> {
        Self::forward(strategy, parse_amount(amount, currency)?, context)
    }

    /// Creates a backward request from a decimal string.
    pub fn backward_from_str(
        strategy: impl AsRef<str>,
        amount: &str,
        currency: Currency,
        context: Context,
    ) -> FeeResult<Self> {
        Self::backward(strategy, parse_amount(amount, currency)?, context)
    }

    /// Returns the strategy name.
    #[must_use]
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Returns the direction.
    #[must_use]
    pub const fn direction(&self) -> CalculationDirection {
        self.direction
    }

    /// Returns the amount: the base when forward, the total when backward.
    #[must_use]
    pub const fn amount(&self) -> &Amount {
        &self.amount
    }

    /// Returns the context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns a copy carrying another amount.
    #[must_use]
    pub fn with_amount(&self, amount: Amount) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// Returns a copy carrying another context.
    #[must_use]
    pub fn with_context(&self, context: Context) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }
}

fn parse_amount(amount: &str, currency: Currency) -> FeeResult<Amount> {
    Amount::new(amount, currency).map_err(|err| match err {
        MoneyError::NotDecimalString(value) | MoneyError::DecimalOverflow(value) => {
            FeeError::InvalidAmountFormat(value)
        }
        other => FeeError::Money(other),
    })
}

/// Outcome of a single strategy calculation.
///
/// Forward results satisfy `base + fee == total`, backward results satisfy
/// `total - fee == base`; all three amounts share one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    base_amount: Amount,
    fee_amount: Amount,
    total_amount: Amount,
    direction: CalculationDirection,
    context: Context,
}

impl CalculationResult {
    /// Creates a result, rejecting amounts in different currencies.
    pub fn new(
        base_amount: Amount,
        fee_amount: Amount,
        total_amount: Amount,
        direction: CalculationDirection,
        context: Context,
    ) -> FeeResult<Self> {
        for other in [&fee_amount, &total_amount] {
            if other.currency() != base_amount.currency() {
                return Err(MoneyError::CurrencyMismatch {
                    left: base_amount.currency().to_string(),
                    right: other.currency().to_string(),
                    operation: "calculation result",
                }
                .into());
            }
        }

        Ok(Self {
            base_amount,
            fee_amount,
            total_amount,
            direction,
            context,
        })
    }

    /// Returns the base amount.
    #[must_use]
    pub const fn base_amount(&self) -> &Amount {
        &self.base_amount
    }

    /// Returns the fee amount.
    #[must_use]
    pub const fn fee_amount(&self) -> &Amount {
        &self.fee_amount
    }

    /// Returns the total amount.
    #[must_use]
    pub const fn total_amount(&self) -> &Amount {
        &self.total_amount
    }

    /// Returns the direction the result was calculated in.
    #[must_use]
    pub const fn direction(&self) -> CalculationDirection {
        self.direction
    }

    /// Returns the result context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the currency shared by all three amounts.
    #[must_use]
    pub const fn currency(&self) -> &Currency {
        self.base_amount.currency()
    }

    /// Returns a copy with each amount passed through `map`.
    #[must_use]
    pub fn map_amounts(&self, map: impl Fn(&Amount) -> Amount) -> Self {
        Self {
            base_amount: map(&self.base_amount),
            fee_amount: map(&self.fee_amount),
            total_amount: map(&self.total_amount),
            ..self.clone()
        }
    }

    /// Returns a copy carrying another context.
    #[must_use]
    pub fn with_context(&self, context: Context) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD", 2).unwrap()
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(CalculationDirection::Forward.to_string(), "forward");
        assert_eq!(CalculationDirection::Backward.to_string(), "backward");
    }

    #[test]
    fn test_request_trims_strategy_name() {
        let amount = Amount::new("10", usd()).unwrap();
        let request = CalculationRequest::backward("  wise.transfer\t", amount, Context::new()).unwrap();
        assert_eq!(request.strategy(), "wise.transfer");
        assert_eq!(request.direction(), CalculationDirection::Backward);
    }

    #[test]
    fn test_request_rejects_empty_strategy_name() {
        let amount = Amount::new("10", usd()).unwrap();
        assert_eq!(
            CalculationRequest::forward("   ", amount, Context::new()),
            Err(FeeError::EmptyStrategyName)
        );
    }

    #[test]
    fn test_request_from_str_reports_invalid_amount() {
        assert_eq!(
            CalculationRequest::forward_from_str("flat", "12,50", usd(), Context::new()),
            Err(FeeError::InvalidAmountFormat("12,50".into()))
        );

        let request =
            CalculationRequest::backward_from_str("flat", "103.2", usd(), Context::new()).unwrap();
        assert_eq!(request.amount().value(), dec!(103.20));
    }

    #[test]
    fn test_request_with_copies() {
        let amount = Amount::new("10", usd()).unwrap();
        let request = CalculationRequest::forward("flat", amount, Context::new()).unwrap();

        let moved = request.with_amount(Amount::new("20", usd()).unwrap());
        let tagged = request.with_context(Context::new().with("k", "v"));

        assert_eq!(request.amount().value(), dec!(10));
        assert_eq!(moved.amount().value(), dec!(20));
        assert!(request.context().is_empty());
        assert_eq!(tagged.context().len(), 1);
    }

    #[test]
    fn test_result_rejects_mixed_currencies() {
        let eur = Currency::new("EUR", 2).unwrap();
        let result = CalculationResult::new(
            Amount::new("100", usd()).unwrap(),
            Amount::new("3", eur).unwrap(),
            Amount::new("103", usd()).unwrap(),
            CalculationDirection::Forward,
            Context::new(),
        );

        assert!(matches!(
            result,
            Err(FeeError::Money(MoneyError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn test_result_serializes_amounts() {
        let result = CalculationResult::new(
            Amount::new("100", usd()).unwrap(),
            Amount::new("3.2", usd()).unwrap(),
            Amount::new("103.2", usd()).unwrap(),
            CalculationDirection::Forward,
            Context::new(),
        )
        .unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["fee_amount"]["value"], "3.20");
        assert_eq!(json["direction"], "forward");
    }
}
