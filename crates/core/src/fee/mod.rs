//! Fee value type and the strategy-free fee calculator.

pub mod calculator;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::FeeCalculator;
pub use types::{Fee, parse_percentage};
