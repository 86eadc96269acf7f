//! Fee calculation engine for feecalc.
//!
//! This crate contains pure computation with ZERO I/O: no web, database, or
//! async dependencies. Every operation is a function of its inputs, so one
//! engine can be shared read-only across threads.
//!
//! # Modules
//!
//! - `context` - Typed key/value context passed to strategies
//! - `fee` - Percentage + fixed fee value and strategy-free calculator
//! - `strategy` - Fee strategy trait, built-in strategies, composite solver
//! - `registry` - Name-keyed strategy registry
//! - `engine` - Strategy dispatch and scale normalization
//! - `chain` - Multi-step calculation chains

pub mod chain;
pub mod context;
pub mod engine;
pub mod error;
pub mod fee;
pub mod registry;
pub mod strategy;

pub use chain::{
    CalculationChainRequest, ChainResult, ChainResultSelection, ChainStep, ChainStepInputSource,
    ChainStepResult, FeeCalculationChain,
};
pub use context::{Context, ContextValue};
pub use engine::FeeEngine;
pub use error::{FeeError, FeeResult};
pub use fee::{Fee, FeeCalculator};
pub use registry::StrategyRegistry;
pub use strategy::{
    AdyenInterchangePlusPlusStrategy, CalculationDirection, CalculationRequest, CalculationResult,
    CompositeFeeStrategy, FeeStrategy, FlatRateStrategy, PayPalCommercialTransactionStrategy,
    WiseTransferStrategy,
};
