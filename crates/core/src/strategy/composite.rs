//! Composite strategy: several strategies charged on the same base.
//!
//! Forward is the sum of the children's fees. Backward has no closed form in
//! general, so the base is found by bisection over `[0, total]`. Children are
//! evaluated on working amounts carrying the strategy scale rather than the
//! currency scale; the best candidate is truncated to the strategy scale and
//! one final forward pass produces the component results. The returned total
//! is the requested one, the base is presented at the currency scale, and the
//! fee is their difference.

use std::sync::Arc;

use feecalc_shared::{Amount, Math};
use rust_decimal::Decimal;
use tracing::{trace, warn};

use super::schedule::StrategyScale;
use super::types::{CalculationDirection, CalculationRequest, CalculationResult};
use super::{FeeStrategy, ensure_supported, strategy_name};
use crate::context::{Context, ContextValue};
use crate::error::{FeeError, FeeResult};

/// Default bisection iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Context key holding overrides applied to every child.
pub const SHARED_CONTEXT_KEY: &str = "shared";

/// Context key holding per-child overrides keyed by child name.
pub const COMPONENTS_CONTEXT_KEY: &str = "components";

/// Result context key holding each child's amounts and context.
pub const COMPONENT_RESULTS_KEY: &str = "component_results";

/// Aggregates child strategies applied to the same base amount.
pub struct CompositeFeeStrategy {
    name: String,
    strategies: Vec<Arc<dyn FeeStrategy>>,
    scale: StrategyScale,
    max_iterations: u32,
}

/// Forward evaluation of every child at one base.
struct Evaluation {
    fee: Amount,
    total: Amount,
    components: Context,
}

impl CompositeFeeStrategy {
    /// Creates a composite strategy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidComposite` when `strategies` is empty.
    pub fn new(
        name: impl AsRef<str>,
        strategies: Vec<Arc<dyn FeeStrategy>>,
        scale: u32,
    ) -> FeeResult<Self> {
        let name = strategy_name(name)?;
        if strategies.is_empty() {
            return Err(FeeError::InvalidComposite(name));
        }

        Ok(Self {
            name,
            strategies,
            scale: StrategyScale::new(scale)?,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    /// Overrides the bisection iteration cap (never below one).
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Returns the child strategies.
    #[must_use]
    pub fn strategies(&self) -> &[Arc<dyn FeeStrategy>] {
        &self.strategies
    }

    /// Returns the bisection iteration cap.
    #[must_use]
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    fn component_context(&self, child: &str, context: &Context) -> FeeResult<Context> {
        let mut base = context.clone();
        base.remove(COMPONENTS_CONTEXT_KEY);
        base.remove(SHARED_CONTEXT_KEY);

        if let Some(shared) = context.map(SHARED_CONTEXT_KEY)? {
            base = base.merged(shared);
        }
        if let Some(components) = context.map(COMPONENTS_CONTEXT_KEY)?
            && let Some(specific) = components.map(child).map_err(|_| FeeError::InvalidContextValue {
                key: format!("{COMPONENTS_CONTEXT_KEY}.{child}"),
                expected: "a map",
            })?
        {
            base = base.merged(specific);
        }

        Ok(base)
    }

    fn evaluate(&self, base: &Amount, context: &Context) -> FeeResult<Evaluation> {
        let mut fee = Amount::zero(base.currency().clone());
        let mut components = Context::new();

        for strategy in &self.strategies {
            ensure_supported(strategy.as_ref(), CalculationDirection::Forward)?;
            let child_context = self.component_context(strategy.name(), context)?;
            let request = CalculationRequest::forward(strategy.name(), base.clone(), child_context)?;
            let result = strategy.calculate_forward(&request)?;

            fee = fee.checked_add(result.fee_amount())?;
            components.insert(strategy.name(), component_summary(&result));
        }

        let total = base.checked_add(&fee)?;
        Ok(Evaluation { fee, total, components })
    }

    fn result(
        &self,
        request: &CalculationRequest,
        amounts: (Amount, Amount, Amount),
        components: Context,
        direction: CalculationDirection,
    ) -> FeeResult<CalculationResult> {
        let (base, fee, total) = amounts;
        let metadata = Context::new()
            .with("strategy", self.name.as_str())
            .with(COMPONENT_RESULTS_KEY, components);

        CalculationResult::new(base, fee, total, direction, request.context().merged(&metadata))
    }

    /// Finds the base whose forward total is closest to `target`.
    ///
    /// Returns the base at the strategy scale and the forward evaluation at
    /// that base.
    fn solve(&self, target: &Amount, context: &Context) -> FeeResult<(Amount, Evaluation)> {
        let working = target.rescaled(self.scale.scale())?;
        let minimal = self.evaluate(&working.with_value(Decimal::ZERO), context)?;
        if working.value() < minimal.total.value() {
            return Err(FeeError::BelowMinimalTotal {
                total: target.to_string(),
                minimal: display_minimal(&minimal.total, target).to_string(),
            });
        }

        let calculation_scale = self.scale.calculation_scale();
        let tolerance = self.scale.tolerance();

        let mut lower = Decimal::ZERO;
        let mut upper = working.value();
        let mut best_base = Decimal::ZERO;
        let mut best_difference = Math::subtract_decimal(working.value(), minimal.total.value(), calculation_scale)?;
        let mut converged = best_difference <= tolerance;

        let mut iteration = 0;
        while !converged && iteration < self.max_iterations {
            let sum = Math::add_decimal(lower, upper, calculation_scale)?;
            let mid = Math::divide_decimal(sum, Decimal::TWO, calculation_scale)?;
            let candidate = working.with_value(mid);
            let total = self.evaluate(&candidate, context)?.total;
            let difference = Math::subtract_decimal(total.value(), working.value(), calculation_scale)?.abs();

            trace!(
                strategy = %self.name,
                iteration,
                base = %candidate,
                total = %total,
                difference = %difference,
                "composite bisection step"
            );

            if difference < best_difference {
                best_difference = difference;
                best_base = candidate.value();
            }
            converged = difference <= tolerance;

            if total.value() > working.value() {
                upper = mid;
            } else {
                lower = mid;
            }
            iteration += 1;
        }

        if !converged {
            warn!(
                strategy = %self.name,
                iterations = self.max_iterations,
                difference = %best_difference,
                "composite solver reached its iteration cap before tolerance"
            );
        }

        let base = working.with_value(best_base);
        let evaluation = self.evaluate(&base, context)?;
        Ok((base, evaluation))
    }
}

/// The minimal total at the currency scale when that is exact, at the
/// strategy scale otherwise.
fn display_minimal(minimal: &Amount, target: &Amount) -> Decimal {
    let mut value = minimal.value().normalize();
    if value.scale() < target.currency().scale() {
        value.rescale(target.currency().scale());
    }
    value
}

fn component_summary(result: &CalculationResult) -> Context {
    Context::new()
        .with("base_amount", result.base_amount().value())
        .with("fee_amount", result.fee_amount().value())
        .with("total_amount", result.total_amount().value())
        .with("context", ContextValue::Map(result.context().clone()))
}

impl FeeStrategy for CompositeFeeStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_direction(&self, direction: CalculationDirection) -> bool {
        self.strategies
            .iter()
            .all(|strategy| strategy.supports_direction(direction))
    }

    fn calculate_forward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        ensure_supported(self, CalculationDirection::Forward)?;
        let base = request.amount().clone();
        let Evaluation { fee, total, components } = self.evaluate(&base, request.context())?;
        self.result(request, (base, fee, total), components, CalculationDirection::Forward)
    }

    fn calculate_backward(&self, request: &CalculationRequest) -> FeeResult<CalculationResult> {
        ensure_supported(self, CalculationDirection::Backward)?;
        let total = request.amount().clone();
        let (working_base, evaluation) = self.solve(&total, request.context())?;

        let base = Amount::from_decimal(working_base.value(), total.currency().clone());
        let fee = total.checked_sub(&base)?;
        self.result(request, (base, fee, total), evaluation.components, CalculationDirection::Backward)
    }
}

impl std::fmt::Debug for CompositeFeeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFeeStrategy")
            .field("name", &self.name)
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("scale", &self.scale)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}
