//! Shared percentage + fixed arithmetic for the built-in strategies.
//!
//! Every single strategy reduces a request to an effective [`Fee`] and lets
//! [`StrategyScale`] apply the affine formula:
//!
//! - forward: `fee = amount * rate + fixed`, `total = amount + fee`
//! - backward: `base = (total - fixed) / (1 + rate)`, `fee = total - base`
//!
//! Deriving the backward fee by subtraction keeps `total - fee == base`
//! exact after truncation.

use feecalc_shared::math::MAX_SCALE;
use feecalc_shared::{Amount, Math};
use rust_decimal::Decimal;

use super::types::{CalculationDirection, CalculationRequest, CalculationResult};
use crate::context::Context;
use crate::error::FeeResult;
use crate::fee::Fee;

/// Scale used by the built-in strategies unless configured otherwise.
pub const DEFAULT_STRATEGY_SCALE: u32 = 8;

/// Extra digits carried by intermediate strategy arithmetic.
const CALCULATION_GUARD_DIGITS: u32 = 4;

/// Strategy output scale plus the wider scale used for intermediates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyScale {
    scale: u32,
    calculation_scale: u32,
}

impl StrategyScale {
    /// Creates a strategy scale.
    pub fn new(scale: u32) -> FeeResult<Self> {
        let scale = Math::check_scale(scale)?;
        Ok(Self {
            scale,
            calculation_scale: (scale + CALCULATION_GUARD_DIGITS).min(MAX_SCALE),
        })
    }

    /// Returns the output scale.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns the scale used for intermediate values.
    #[must_use]
    pub const fn calculation_scale(&self) -> u32 {
        self.calculation_scale
    }

    /// Returns `10^-scale`.
    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        Decimal::new(1, self.scale)
    }

    /// Adds two rates or surcharges at the calculation scale.
    pub fn sum(&self, left: Decimal, right: Decimal) -> FeeResult<Decimal> {
        Ok(Math::add_decimal(left, right, self.calculation_scale)?)
    }

    /// Truncates a value to the output scale.
    #[must_use]
    pub fn truncate(&self, value: Decimal) -> Decimal {
        Math::truncate(value, self.scale)
    }

    /// Builds the effective fee for a request's currency.
    pub fn fee(&self, request: &CalculationRequest, rate: Decimal, fixed: Decimal) -> FeeResult<Fee> {
        let fixed = request.amount().with_value(self.truncate(fixed));
        Fee::from_decimal(rate, Some(fixed))
    }

    /// Applies `fee` forward to the request amount.
    pub fn forward(
        &self,
        request: &CalculationRequest,
        fee: &Fee,
        metadata: &Context,
    ) -> FeeResult<CalculationResult> {
        let base = request.amount().clone();
        let fee_amount = self.fee_for_base(&base, fee)?;
        let total = base.checked_add(&fee_amount)?;

        CalculationResult::new(
            base,
            fee_amount,
            total,
            CalculationDirection::Forward,
            request.context().merged(metadata),
        )
    }

    /// Inverts `fee` from the request amount, read as a total.
    pub fn backward(
        &self,
        request: &CalculationRequest,
        fee: &Fee,
        metadata: &Context,
    ) -> FeeResult<CalculationResult> {
        let total = request.amount().clone();
        let divisor = Math::one_plus_percentage_decimal(fee.percent(), self.calculation_scale)?;
        let adjusted = Math::subtract_decimal(total.value(), fee.fixed_value(), self.calculation_scale)?;
        let base_value = Math::divide_decimal(adjusted, divisor, self.calculation_scale)?;

        let base = total.with_value(self.truncate(base_value));
        let fee_amount = total.checked_sub(&base)?;

        CalculationResult::new(
            base,
            fee_amount,
            total,
            CalculationDirection::Backward,
            request.context().merged(metadata),
        )
    }

    fn fee_for_base(&self, base: &Amount, fee: &Fee) -> FeeResult<Amount> {
        let percentage = Math::apply_percentage_decimal(base.value(), fee.percent(), self.calculation_scale)?;
        let value = Math::add_decimal(percentage, fee.fixed_value(), self.calculation_scale)?;
        Ok(base.with_value(self.truncate(value)))
    }
}

impl Default for StrategyScale {
    fn default() -> Self {
        Self {
            scale: DEFAULT_STRATEGY_SCALE,
            calculation_scale: DEFAULT_STRATEGY_SCALE + CALCULATION_GUARD_DIGITS,
        }
    }
}
