//! PayPal commercial transaction pricing.

use rust_decimal::Decimal;

use super::schedule::StrategyScale;
use super::types::{CalculationDirection, CalculationRequest, CalculationResult};
use super::{FeeStrategy, strategy_name};
use crate::context::Context;
use crate::error::FeeResult;
use crate::fee::Fee;

/// Default registry name.
pub const PAYPAL_COMMERCIAL_TRANSACTION: &str = "paypal.commercial_transaction";

const DOCUMENTATION: &str = "https://www.paypal.com/us/webapps/mpp/merchant-fees";

/// 3.49% + 0.49, with optional per-request surcharges.
///
/// Context keys:
/// - `cross_border` (bool): adds the cross-border percentage (1.5% by default)
/// - `additional_percentage`, `currency_conversion_percentage`: added to the rate
/// - `additional_fixed_fee`: added to the fixed fee
#[derive(Debug, Clone)]
pub struct PayPalCommercialTransactionStrategy {
    name: String,
    base_percentage_rate: Decimal,
    fixed_fee: Decimal,
    cross_border_percentage: Decimal,
    scale: StrategyScale,
}

impl PayPalCommercialTransactionStrategy {
    /// Creates the strategy with PayPal's published defaults.
    pub fn new(scale: u32) -> FeeResult<Self> {
        Self::with_rates(
            PAYPAL_COMMERCIAL_TRANSACTION,
            Decimal::new(349, 4),
            Decimal::new(49, 2),
            Decimal::new(15, 3),
            scale,
        )
    }

    /// Creates the strategy with custom rates.
    pub fn with_rates(
        name: impl AsRef<str>,
        base_percentage_rate: Decimal,
        fixed_fee: Decimal,
        cross_border_percentage: Decimal,
        scale: u32,
    ) -> FeeResult<Self> {
        Ok(Self {
            name: strategy_name(name)?,
            base_percentage_rate,
            fixed_fee,
            cross_border_percentage,
            scale: StrategyScale::new(scale)?,
        })
    }

    fn resolve(&self, request: &CalculationRequest) -> FeeResult<(Fee, Context)> {
        let context = request.context();
        let mut rate = self.base_percentage_rate;
        let mut metadata = Context::new().with("base_percentage_rate", self.base_percentage_rate);

        if context.flag("cross_border")? {
            rate = self.scale.sum(rate, self.cross_border_percentage)?;
            metadata.insert("cross_border_percentage", self.cross_border_percentage);
        }

        for key in ["additional_percentage", "currency_conversion_percentage"] {
            if let Some(extra) = context.decimal(key)? {
                rate = self.scale.sum(rate, extra)?;
                metadata.insert(key, extra);
            }
        }

        let mut fixed = self.fixed_fee;
        metadata.insert("fixed_fee", self.fixed_fee);
        if let Some(extra) = context.decimal("additional_fixed_fee")? {
            fixed = self.scale.sum(fixed, extra)?;
            metadata.insert("additional_fixed_fee", extra);
        }

        metadata.insert("strategy", self.name.as_str());
        metadata.insert("documentation", DOCUMENTATION);

        Ok((self.scale.fee(request, rate, fixed)?, metadata))
    }
}

impl FeeStrategy for PayPalCommercialTransactionStrategy {
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
