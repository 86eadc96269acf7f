//! Property-based tests for strategies.
//!
//! - Round-trip invertibility of single strategies, to within one cent
//! - Additivity of composite forward calculation
//! - Composite solver convergence and precondition

use std::sync::Arc;

use feecalc_shared::{Amount, Currency};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::composite::COMPONENT_RESULTS_KEY;
use super::*;
use crate::context::{Context, ContextValue};
use crate::error::FeeError;

fn usd() -> Currency {
    Currency::new("USD", 2).unwrap()
}

/// Strategy to generate base amounts (0.01 to 100,000.00).
fn base_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate rates with four decimal places in [0, 0.5].
fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..=5_000i64).prop_map(|basis| Decimal::new(basis, 4))
}

/// Strategy to generate fixed fees (0.00 to 5.00).
fn fixed() -> impl Strategy<Value = Decimal> {
    (0i64..=500i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn flat(name: &str, rate: Decimal, fixed: Decimal) -> FlatRateStrategy {
    FlatRateStrategy::new(name, &rate.to_string(), &fixed.to_string(), 8).unwrap()
}

fn composite(first: (Decimal, Decimal), second: (Decimal, Decimal)) -> CompositeFeeStrategy {
    CompositeFeeStrategy::new(
        "bundle",
        vec![
            Arc::new(flat("first", first.0, first.1)),
            Arc::new(flat("second", second.0, second.1)),
        ],
        8,
    )
    .unwrap()
}

fn run(strategy: &dyn FeeStrategy, direction: CalculationDirection, value: Decimal) -> FeeResult<CalculationResult> {
    let request = CalculationRequest::new(
        strategy.name(),
        direction,
        Amount::from_decimal(value, usd()),
        Context::new(),
    )?;
    strategy.calculate(&request)
}

proptest! {
    /// backward(forward(x)).base is x, or one cent below it when the
    /// forward fee had digits past the cent that truncation dropped.
    #[test]
    fn prop_single_strategy_round_trip(
        base in base_amount(),
        rate in rate(),
        fixed in fixed(),
    ) {
        let strategy = flat("single", rate, fixed);
        let forward = run(&strategy, CalculationDirection::Forward, base).unwrap();
        let backward = run(&strategy, CalculationDirection::Backward, forward.total_amount().value()).unwrap();

        let exact_fee = base * rate + fixed;
        let expected = if exact_fee == forward.fee_amount().value() { base } else { base - Decimal::new(1, 2) };
        prop_assert_eq!(backward.base_amount().value(), expected);
        prop_assert_eq!(backward.total_amount(), forward.total_amount());
    }

    /// Forward base + fee == total and backward total - fee == base, exactly.
    #[test]
    fn prop_result_invariants(
        amount in base_amount(),
        rate in rate(),
        fixed in fixed(),
    ) {
        let strategy = flat("single", rate, fixed);

        let forward = run(&strategy, CalculationDirection::Forward, amount).unwrap();
        prop_assert_eq!(
            forward.base_amount().checked_add(forward.fee_amount()).unwrap(),
            forward.total_amount().clone()
        );

        let backward = run(&strategy, CalculationDirection::Backward, amount).unwrap();
        prop_assert_eq!(
            backward.total_amount().checked_sub(backward.fee_amount()).unwrap(),
            backward.base_amount().clone()
        );
    }

    /// composite.forward(x).fee == sum of child fees.
    #[test]
    fn prop_composite_forward_is_additive(
        base in base_amount(),
        first in (rate(), fixed()),
        second in (rate(), fixed()),
    ) {
        let composite = composite(first, second);
        let result = run(&composite, CalculationDirection::Forward, base).unwrap();

        let expected: Decimal = composite
            .strategies()
            .iter()
            .map(|child| run(child.as_ref(), CalculationDirection::Forward, base).unwrap().fee_amount().value())
            .sum();

        prop_assert_eq!(result.fee_amount().value(), expected);
    }

    /// composite.backward(target) returns target as its total, and the
    /// forward pass at the solved base lands within 10^-8 of it.
    #[test]
    fn prop_composite_solver_converges(
        base in base_amount(),
        first in (rate(), fixed()),
        second in (rate(), fixed()),
        offset in 0i64..100,
    ) {
        let composite = composite(first, second);
        let target = run(&composite, CalculationDirection::Forward, base).unwrap().total_amount().value()
            + Decimal::new(offset, 2);

        let solved = run(&composite, CalculationDirection::Backward, target).unwrap();
        prop_assert_eq!(solved.total_amount().value(), target);
        prop_assert_eq!(
            solved.base_amount().checked_add(solved.fee_amount()).unwrap(),
            solved.total_amount().clone()
        );

        let components = solved.context().map(COMPONENT_RESULTS_KEY).unwrap().unwrap();
        let mut working_total = None;
        for (_, component) in components.iter() {
            let ContextValue::Map(component) = component else {
                return Err(TestCaseError::fail("component result is not a map"));
            };
            let working_base = component.decimal("base_amount").unwrap().unwrap();
            let fee = component.decimal("fee_amount").unwrap().unwrap();
            working_total = Some(working_total.unwrap_or(working_base) + fee);
        }
        let working_total = working_total.unwrap();

        prop_assert!(
            (working_total - target).abs() <= Decimal::new(1, 8),
            "target {} working total {}", target, working_total
        );
    }

    /// composite.backward(target) fails below composite.forward(0).total.
    #[test]
    fn prop_composite_rejects_totals_below_minimum(
        first in (rate(), 1i64..=500),
        second in (rate(), fixed()),
        shortfall in 1i64..=100,
    ) {
        let composite = composite((first.0, Decimal::new(first.1, 2)), second);
        let minimal = run(&composite, CalculationDirection::Forward, Decimal::ZERO).unwrap().total_amount().value();
        let target = minimal - Decimal::new(shortfall.min(first.1), 2);

        let result = run(&composite, CalculationDirection::Backward, target);
        let is_below_minimal = matches!(result, Err(FeeError::BelowMinimalTotal { .. }));
        prop_assert!(is_below_minimal);
    }
}
