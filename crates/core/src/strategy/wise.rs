//! Wise transfer pricing.

use rust_decimal::Decimal;

use super::schedule::StrategyScale;
use super::types::{CalculationDirection, CalculationRequest, CalculationResult};
use super::{FeeStrategy, strategy_name};
use crate::context::Context;
use crate::error::FeeResult;
use crate::fee::Fee;

/// Default registry name.
pub const WISE_TRANSFER: &str = "wise.transfer";

const DOCUMENTATION: &str = "https://wise.com/help/articles/2932695/fees-and-pricing";

/// 0.65% + 0.31 by default.
///
/// `variable_percentage` and `fixed_fee` replace the defaults;
/// `additional_percentage` and `additional_fixed_fee` are added on top.
#[derive(Debug, Clone)]
pub struct WiseTransferStrategy {
    name: String,
    variable_percentage: Decimal,
    fixed_fee: Decimal,
    scale: StrategyScale,
}

impl WiseTransferStrategy {
    /// Creates the strategy with Wise's default pricing.
    pub fn new(scale: u32) -> FeeResult<Self> {
        Self::with_rates(WISE_TRANSFER, Decimal::new(65, 4), Decimal::new(31, 2), scale)
    }

    /// Creates the strategy with custom defaults.
    pub fn with_rates(
        name: impl AsRef<str>,
        variable_percentage: Decimal,
        fixed_fee: Decimal,
        scale: u32,
    ) -> FeeResult<Self> {
        Ok(Self {
            name: strategy_name(name)?,
            variable_percentage,
            fixed_fee,
            scale: StrategyScale::new(scale)?,
        })
    }

    fn resolve(&self, request: &CalculationRequest) -> FeeResult<(Fee, Context)> {
        let context = request.context();
        let mut rate = context.decimal_or("variable_percentage", self.variable_percentage)?;
        let mut fixed = context.decimal_or("fixed_fee", self.fixed_fee)?;

        if let Some(extra) = context.decimal("additional_percentage")? {
            rate = self.scale.sum(rate, extra)?;
        }
        if let Some(extra) = context.decimal("additional_fixed_fee")? {
            fixed = self.scale.sum(fixed, extra)?;
        }

        let metadata = Context::new()
            .with("strategy", self.name.as_str())
            .with("variable_percentage", rate)
            .with("fixed_fee", fixed)
            .with("documentation", DOCUMENTATION);

        Ok((self.scale.fee(request, rate, fixed)?, metadata))
    }
}

impl FeeStrategy for WiseTransferStrategy {
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
