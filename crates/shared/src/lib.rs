//! Shared types, errors, and configuration for feecalc.
//!
//! This crate provides the building blocks used by the fee engine:
//! - Decimal arithmetic core over base-10 strings
//! - Currency and amount value types
//! - Low-level error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod math;
pub mod types;

pub use config::FeeConfig;
pub use error::{MoneyError, MoneyResult};
pub use math::Math;
pub use types::{Amount, Currency};
