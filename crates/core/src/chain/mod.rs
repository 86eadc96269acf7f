//! Multi-step fee calculation chains.
//!
//! A chain runs strategies strictly in sequence; each step reads its input
//! from the initial amount or from a selected facet of the previous step.

pub mod service;
pub mod types;


pub use service::FeeCalculationChain;
pub use types::{
    CalculationChainRequest, ChainResult, ChainResultSelection, ChainStep, ChainStepInputSource,
    ChainStepResult,
};
