//! Property-based tests for the decimal core.
//!
//! - Normalization is idempotent
//! - `enforce_scale` fails exactly when truncation changes the value

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::Math;
use crate::error::MoneyError;

/// Strategy to generate decimal strings with 0 to 8 fractional digits.
fn decimal_string() -> impl Strategy<Value = String> {
    (-1_000_000_000_000i64..1_000_000_000_000i64, 0u32..=8)
        .prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale).to_string())
}

/// Strategy to generate target scales (0 to 10).
fn target_scale() -> impl Strategy<Value = u32> {
    0u32..=10
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* decimal string and scale, normalizing twice equals
    /// normalizing once.
    #[test]
    fn prop_normalize_is_idempotent(value in decimal_string(), scale in target_scale()) {
        let once = Math::normalize(&value, scale).unwrap();
        let twice = Math::normalize(&once, scale).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// *For any* decimal string, the normalized form has exactly `scale`
    /// fractional digits.
    #[test]
    fn prop_normalize_has_exact_scale(value in decimal_string(), scale in target_scale()) {
        let normalized = Math::normalize(&value, scale).unwrap();
        let fractional = normalized.split_once('.').map_or(0, |(_, f)| f.len());
        prop_assert_eq!(fractional, scale as usize);
    }

    /// *For any* decimal string and scale, `enforce_scale` fails with
    /// `PrecisionLoss` iff truncation changes the numeric value.
    #[test]
    fn prop_enforce_scale_matches_truncation(value in decimal_string(), scale in target_scale()) {
        let parsed = Math::parse(&value).unwrap();
        let changes_value = Math::truncate(parsed, scale) != parsed;

        match Math::enforce_scale(&value, scale) {
            Ok(enforced) => {
                prop_assert!(!changes_value);
                prop_assert_eq!(Math::parse(&enforced).unwrap(), parsed);
            }
            Err(MoneyError::PrecisionLoss { .. }) => prop_assert!(changes_value),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    /// *For any* value, padding with insignificant trailing zeros never
    /// counts as a precision loss.
    #[test]
    fn prop_trailing_zeros_are_insignificant(mantissa in -1_000_000i64..1_000_000i64, zeros in 1usize..40) {
        let value = format!("{}{}", Decimal::new(mantissa, 2), "0".repeat(zeros));
        prop_assert_eq!(Math::enforce_scale(&value, 2).unwrap(), Math::normalize(&value, 2).unwrap());
        prop_assert_eq!(Math::parse(&value).unwrap(), Decimal::new(mantissa, 2));
    }

    /// *For any* value, digits past the target scale never change the
    /// normalized form, however many there are.
    #[test]
    fn prop_normalize_ignores_digits_past_scale(value in decimal_string(), tail in "[0-9]{1,40}") {
        let with_fraction = if value.contains('.') { value.clone() } else { format!("{value}.0") };
        let padded = format!("{with_fraction}{}", "0".repeat(8));
        let extended = format!("{padded}{tail}");
        prop_assert_eq!(Math::normalize(&extended, 8).unwrap(), Math::normalize(&value, 8).unwrap());
    }

    /// *For any* two values, subtraction undoes addition at a shared scale.
    #[test]
    fn prop_add_then_subtract(left in decimal_string(), right in decimal_string()) {
        let sum = Math::add(&left, &right, 8).unwrap();
        let back = Math::subtract(&sum, &right, 8).unwrap();
        prop_assert_eq!(Math::parse(&back).unwrap(), Math::parse(&left).unwrap());
    }
}
