//! Fee strategies: named formulas mapping an amount to base, fee, and total.

pub mod adyen;
pub mod composite;
pub mod flat;
pub mod paypal;
pub mod schedule;
pub mod types;
pub mod wise;

#[cfg(test)]
mod props;

pub use adyen::AdyenInterchangePlusPlusStrategy;
pub use composite::CompositeFeeStrategy;
pub use flat::FlatRateStrategy;
pub use paypal::PayPalCommercialTransactionStrategy;
pub use schedule::StrategyScale;
pub use types::{CalculationDirection, CalculationRequest, CalculationResult};
pub use wise::WiseTransferStrategy;

use crate::error::{FeeError, FeeResult};

/// A fee formula that can be looked up by name.
///
/// Implementations hold only immutable configuration, so one instance can be
/// shared across threads.
pub trait FeeStrategy: Send + Sync {
    /// Registry name of the strategy.
    fn name(&self) -> &str;

    /// Returns true if the strategy can calculate in `direction`.
    fn supports_direction(&self, direction: CalculationDirection) -> bool;

    /// Calculates fee and total from the request's base amount.
    fn calculate_forward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult>;

    /// Calculates base and fee from the request's total amount.
    fn calculate_backward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult>;

    /// Checks direction support, then dispatches on the request direction.
    fn calculate(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        ensure_supported(self, request.direction())?;
        match request.direction() {
            CalculationDirection::Forward => self.calculate_forward(request),
            CalculationDirection::Backward => self.calculate_backward(request),
        }
    }
}

/// Fails with `UnsupportedDirection` unless `strategy` supports `direction`.
pub fn ensure_supported<S: FeeStrategy + ?Sized>(
    strategy: &S,
    direction: CalculationDirection,
) -> FeeResult<()> {
    if strategy.supports_direction(direction) {
        Ok(())
    } else {
        Err(FeeError::UnsupportedDirection {
            strategy: strategy.name().to_string(),
            direction,
        })
    }
}

/// Trims a strategy name, rejecting empty ones.
pub(crate) fn strategy_name(name: impl AsRef<str>) -> FeeResult<String> {
    let name = name.as_ref().trim();
    if name.is_empty() {
        return Err(FeeError::EmptyStrategyName);
    }
    Ok(name.to_string())
}
