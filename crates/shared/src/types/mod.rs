//! Common value types used across the workspace.

pub mod money;

pub use money::{Amount, Currency};
