//! Adyen Interchange++ pricing.

use rust_decimal::Decimal;

use super::schedule::StrategyScale;
use super::types::{CalculationDirection, CalculationRequest, CalculationResult};
use super::{FeeStrategy, strategy_name};
use crate::context::Context;
use crate::error::FeeResult;
use crate::fee::Fee;

/// Default registry name.
pub const ADYEN_INTERCHANGE_PLUS_PLUS: &str = "adyen.interchange_plus_plus";

const DOCUMENTATION: &str = "https://www.adyen.com/pricing";

const COMPONENTS: [&str; 3] = ["interchange", "scheme", "markup"];

/// Sum of interchange, scheme, and markup components, all read from context.
///
/// Each component has a `{component}_percentage` and a `{component}_fixed`
/// key; missing keys count as zero.
#[derive(Debug, Clone)]
pub struct AdyenInterchangePlusPlusStrategy {
    name: String,
    scale: StrategyScale,
}

impl AdyenInterchangePlusPlusStrategy {
    /// Creates the strategy under its default name.
    pub fn new(scale: u32) -> FeeResult<Self> {
        Self::named(ADYEN_INTERCHANGE_PLUS_PLUS, scale)
    }

    /// Creates the strategy under a custom name.
    pub fn named(name: impl AsRef<str>, scale: u32) -> FeeResult<Self> {
        Ok(Self {
            name: strategy_name(name)?,
            scale: StrategyScale::new(scale)?,
        })
    }

    fn resolve(&self, request: &CalculationRequest) -> FeeResult<(Fee, Context)> {
        let context = request.context();
        let mut metadata = Context::new().with("strategy", self.name.as_str());
        let mut rate = Decimal::ZERO;
        let mut fixed = Decimal::ZERO;

        for component in COMPONENTS {
            let percentage_key = format!("{component}_percentage");
            let fixed_key = format!("{component}_fixed");
            let percentage = context.decimal_or(&percentage_key, Decimal::ZERO)?;
            let surcharge = context.decimal_or(&fixed_key, Decimal::ZERO)?;

            rate = self.scale.sum(rate, percentage)?;
            fixed = self.scale.sum(fixed, surcharge)?;
            metadata.insert(percentage_key, percentage);
            metadata.insert(fixed_key, surcharge);
        }
        metadata.insert("documentation", DOCUMENTATION);

        Ok((self.scale.fee(request, rate, fixed)?, metadata))
    }
}

impl FeeStrategy for AdyenInterchangePlusPlusStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_direction(&self, _direction: CalculationDirection) -> bool {
        true
    }

    fn calculate_forward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        let (fee, metadata) = self.resolve(request)?;
        self.scale.forward(request, &fee, &metadata)
    }

    fn calculate_backward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        let (fee, metadata) = self.resolve(request)?;
        self.scale.backward(request, &fee, &metadata)
    }
}
