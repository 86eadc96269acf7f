//! Fee calculation engine: strategy lookup, direction check, and scale
//! normalization around a single strategy call.

use std::sync::Arc;

use feecalc_shared::{Amount, FeeConfig, Math, MoneyError};
use tracing::debug;

use crate::error::FeeResult;
use crate::registry::StrategyRegistry;
use crate::strategy::{CalculationRequest, CalculationResult, ensure_supported};

/// Stateless orchestrator over a shared [`StrategyRegistry`].
#[derive(Debug, Clone)]
pub struct FeeEngine {
    registry: Arc<StrategyRegistry>,
    scale: u32,
}

impl FeeEngine {
    /// Creates an engine normalizing every amount to `scale`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScale` if `scale` exceeds the decimal backend's range.
    pub fn new(registry: Arc<StrategyRegistry>, scale: u32) -> FeeResult<Self> {
        Ok(Self {
            registry,
            scale: Math::check_scale(scale)?,
        })
    }

    /// Creates an engine and its registry from configuration.
    ///
    /// Any out-of-range engine scale, negative included, is `InvalidScale`.
    /// A bad strategy scale surfaces as reported by the registry.
    pub fn from_config(config: &FeeConfig) -> FeeResult<Self> {
        let scale = config.engine_scale().map_err(|err| match err {
            MoneyError::NegativeScale(scale) => MoneyError::InvalidScale(scale),
            other => other,
        })?;
        let registry = StrategyRegistry::from_config(config)?;
        Self::new(Arc::new(registry), scale)
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Returns the normalization scale.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Truncates an amount to the engine scale.
    ///
    /// Amounts never carry more digits than their currency, so an engine
    /// scale above the currency scale leaves them unchanged.
    #[must_use]
    pub fn normalize_amount(&self, amount: &Amount) -> Amount {
        amount.truncate_to(self.scale)
    }

    /// Runs a request through its named strategy.
    ///
    /// The request amount and all three result amounts are truncated to the
    /// engine scale independently, so with an engine scale below the
    /// currency scale `base + fee` may miss `total` by one unit of the engine
    /// scale.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use feecalc_core::{CalculationRequest, Context, FeeEngine, StrategyRegistry};
    /// use feecalc_shared::{Amount, Currency};
    ///
    /// let registry = Arc::new(StrategyRegistry::with_defaults(8).unwrap());
    /// let engine = FeeEngine::new(registry, 2).unwrap();
    ///
    /// let usd = Currency::new("USD", 2).unwrap();
    /// let request = CalculationRequest::forward(
    ///     "stripe.standard_card",
    ///     Amount::new("100", usd).unwrap(),
    ///     Context::new(),
    /// )
    /// .unwrap();
    ///
    /// let result = engine.calculate(&request).unwrap();
    /// assert_eq!(result.fee_amount().to_string(), "3.20");
    /// assert_eq!(result.total_amount().to_string(), "103.20");
    /// ```
    pub fn calculate(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        let strategy = self.registry.get(request.strategy())?;
        ensure_supported(strategy.as_ref(), request.direction())?;

        let normalized = request.with_amount(self.normalize_amount(request.amount()));
        debug!(
            strategy = %request.strategy(),
            direction = %request.direction(),
            amount = %normalized.amount(),
            currency = %normalized.amount().currency(),
            "calculating fee"
        );

        let result = strategy.calculate(&normalized)?;
        Ok(result.map_amounts(|amount| self.normalize_amount(amount)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feecalc_shared::Currency;
    use rust_decimal_macros::dec;

    use crate::context::Context;
    use crate::error::FeeError;
    use crate::strategy::{CalculationDirection, FlatRateStrategy};

    fn engine(scale: u32) -> FeeEngine {
        FeeEngine::new(Arc::new(StrategyRegistry::with_defaults(8).unwrap()), scale).unwrap()
    }

    fn usd_amount(value: &str) -> Amount {
        Amount::new(value, Currency::new("USD", 2).unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_scale() {
        assert_eq!(
            FeeEngine::new(Arc::new(StrategyRegistry::new()), 29).unwrap_err(),
            FeeError::Money(MoneyError::InvalidScale(29))
        );
    }

    #[test]
    fn test_unknown_strategy() {
        let request = CalculationRequest::forward("nope", usd_amount("1"), Context::new()).unwrap();
        assert_eq!(
            engine(2).calculate(&request),
            Err(FeeError::StrategyNotFound("nope".into()))
        );
    }

    #[test]
    fn test_forward_and_backward() {
        let engine = engine(2);

        let forward = CalculationRequest::forward("stripe.standard_card", usd_amount("100"), Context::new()).unwrap();
        let result = engine.calculate(&forward).unwrap();
        assert_eq!(result.base_amount().to_string(), "100.00");
        assert_eq!(result.fee_amount().to_string(), "3.20");
        assert_eq!(result.total_amount().to_string(), "103.20");

        let backward = CalculationRequest::backward("stripe.standard_card", usd_amount("103.20"), Context::new()).unwrap();
        let result = engine.calculate(&backward).unwrap();
        assert_eq!(result.base_amount().to_string(), "100.00");
        assert_eq!(result.fee_amount().to_string(), "3.20");
        assert_eq!(result.direction(), CalculationDirection::Backward);
    }

    #[test]
    fn test_normalizes_to_engine_scale() {
        let mut registry = StrategyRegistry::new();
        registry.register(FlatRateStrategy::new("tenth", "0.1", "0", 8).unwrap());
        let engine = FeeEngine::new(Arc::new(registry), 1).unwrap();

        let request = CalculationRequest::forward("tenth", usd_amount("12.34"), Context::new()).unwrap();
        let result = engine.calculate(&request).unwrap();

        assert_eq!(result.base_amount().value(), dec!(12.3));
        assert_eq!(result.fee_amount().value(), dec!(1.2));
        assert_eq!(result.total_amount().value(), dec!(13.5));
    }

    #[test]
    fn test_forward_truncates_sub_cent_fees() {
        let engine = engine(2);
        for (base, fee, total) in [("250.55", "7.56", "258.11"), ("10.99", "0.61", "11.60")] {
            let request =
                CalculationRequest::forward("stripe.standard_card", usd_amount(base), Context::new()).unwrap();
            let result = engine.calculate(&request).unwrap();
            assert_eq!(result.fee_amount().to_string(), fee);
            assert_eq!(result.total_amount().to_string(), total);
        }
    }

    #[test]
    fn test_engine_scale_above_currency_scale_keeps_currency_digits() {
        let engine = engine(4);
        let request = CalculationRequest::forward("stripe.standard_card", usd_amount("250.55"), Context::new()).unwrap();
        let result = engine.calculate(&request).unwrap();

        assert_eq!(result.base_amount().to_string(), "250.55");
        assert_eq!(result.fee_amount().to_string(), "7.56");
        assert_eq!(result.total_amount().to_string(), "258.11");
    }

    #[test]
    fn test_from_config() {
        let engine = FeeEngine::from_config(&FeeConfig::default()).unwrap();
        assert_eq!(engine.scale(), 2);
        assert_eq!(engine.registry().len(), 5);
    }

    #[test]
    fn test_from_config_rejects_negative_engine_scale_as_invalid() {
        let mut config = FeeConfig::default();
        config.engine.scale = -1;
        assert_eq!(
            FeeEngine::from_config(&config).unwrap_err(),
            FeeError::Money(MoneyError::InvalidScale(-1))
        );

        config.engine.scale = 29;
        assert_eq!(
            FeeEngine::from_config(&config).unwrap_err(),
            FeeError::Money(MoneyError::InvalidScale(29))
        );
    }
}
