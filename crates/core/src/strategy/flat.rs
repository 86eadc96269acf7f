//! Constant percentage + fixed strategies.

use feecalc_shared::Math;
use rust_decimal::Decimal;

use super::schedule::StrategyScale;
use super::types::{CalculationDirection, CalculationRequest, CalculationResult};
use super::{FeeStrategy, ensure_supported, strategy_name};
use crate::context::Context;
use crate::error::FeeResult;
use crate::fee::parse_percentage;

const STRIPE_DOCUMENTATION: &str = "https://stripe.com/pricing";

/// A strategy with a constant rate and surcharge and no context keys.
#[derive(Debug, Clone)]
pub struct FlatRateStrategy {
    name: String,
    percentage_rate: Decimal,
    fixed_fee: Decimal,
    documentation: Option<&'static str>,
    scale: StrategyScale,
}

impl FlatRateStrategy {
    /// Creates a flat strategy from decimal strings.
    ///
    /// # Example
    ///
    /// ```
    /// use feecalc_core::{FeeStrategy, FlatRateStrategy};
    ///
    /// let strategy = FlatRateStrategy::new("acme.card", "0.025", "0.10", 8).unwrap();
    /// assert_eq!(strategy.name(), "acme.card");
    /// assert!(FlatRateStrategy::new("acme.card", "2.5", "0.10", 8).is_err());
    /// ```
    pub fn new(name: impl AsRef<str>, percentage_rate: &str, fixed_fee: &str, scale: u32) -> FeeResult<Self> {
        Ok(Self {
            name: strategy_name(name)?,
            percentage_rate: parse_percentage(percentage_rate)?,
            fixed_fee: Math::parse(fixed_fee)?,
            documentation: None,
            scale: StrategyScale::new(scale)?,
        })
    }

    /// Stripe standard card pricing: 2.9% + 0.30.
    pub fn stripe_standard_card(scale: u32) -> FeeResult<Self> {
        Self::new("stripe.standard_card", "0.029", "0.30", scale)
            .map(|strategy| strategy.with_documentation(STRIPE_DOCUMENTATION))
    }

    /// Stripe surcharge for international cards: 1.5%.
    pub fn stripe_international_surcharge(scale: u32) -> FeeResult<Self> {
        Self::new("stripe.international_surcharge", "0.015", "0", scale)
            .map(|strategy| strategy.with_documentation(STRIPE_DOCUMENTATION))
    }

    /// Attaches a pricing documentation link to every result context.
    #[must_use]
    pub const fn with_documentation(mut self, documentation: &'static str) -> Self {
        self.documentation = Some(documentation);
        self
    }

    /// Returns the percentage rate.
    #[must_use]
    pub const fn percentage_rate(&self) -> Decimal {
        self.percentage_rate
    }

    /// Returns the fixed surcharge.
    #[must_use]
    pub const fn fixed_fee(&self) -> Decimal {
        self.fixed_fee
    }

    fn metadata(&self) -> Context {
        let mut metadata = Context::new()
            .with("strategy", self.name.as_str())
            .with("percentage_rate", self.percentage_rate)
            .with("fixed_fee", self.fixed_fee);
        if let Some(documentation) = self.documentation {
            metadata.insert("documentation", documentation);
        }
        metadata
    }
}

impl FeeStrategy for FlatRateStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_direction(&self, _direction: CalculationDirection) -> bool {
        true
    }

    fn calculate_forward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        ensure_supported(self, CalculationDirection::Forward)?;
        let fee = self.scale.fee(request, self.percentage_rate, self.fixed_fee)?;
        self.scale.forward(request, &fee, &self.metadata())
    }

    fn calculate_backward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        ensure_supported(self, CalculationDirection::Backward)?;
        let fee = self.scale.fee(request, self.percentage_rate, self.fixed_fee)?;
        self.scale.backward(request, &fee, &self.metadata())
    }
}
