//! Property-based tests for the fee calculator.

use feecalc_shared::{Amount, Currency};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{Fee, FeeCalculator};

fn usd() -> Currency {
    Currency::new("USD", 2).unwrap()
}

/// Strategy to generate positive amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate percentages with four decimal places in [0, 1].
fn percentage() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|basis| Decimal::new(basis, 4))
}

/// Strategy to generate fixed surcharges (0.00 to 10.00).
fn fixed_fee() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    /// Backward undoes forward at the currency scale, landing at most one
    /// cent low when forward truncated digits past the cent.
    #[test]
    fn prop_backward_inverts_forward(
        amount in positive_amount(),
        percent in percentage(),
        fixed in fixed_fee(),
    ) {
        let fee = Fee::from_decimal(percent, Some(Amount::from_decimal(fixed, usd()))).unwrap();
        let base = Amount::from_decimal(amount, usd());

        let total = FeeCalculator::calculate_forward(&base, &fee).unwrap();
        let restored = FeeCalculator::calculate_backward(&total, &fee).unwrap();

        let shortfall = amount - restored.value();
        prop_assert!(
            shortfall >= Decimal::ZERO && shortfall <= Decimal::new(1, 2),
            "base {} restored {}", amount, restored
        );
        if (amount * percent * Decimal::ONE_HUNDRED).fract().is_zero() {
            prop_assert_eq!(restored, base);
        }
    }

    /// The total never falls below the amount plus the fixed surcharge.
    #[test]
    fn prop_forward_is_at_least_amount_plus_fixed(
        amount in positive_amount(),
        percent in percentage(),
        fixed in fixed_fee(),
    ) {
        let fee = Fee::from_decimal(percent, Some(Amount::from_decimal(fixed, usd()))).unwrap();
        let total = FeeCalculator::calculate_forward(&Amount::from_decimal(amount, usd()), &fee).unwrap();

        prop_assert!(total.value() >= amount + fixed);
    }
}
