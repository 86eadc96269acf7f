//! Chain request, step, and result types.

use std::fmt;

use feecalc_shared::Amount;
use serde::Serialize;

use crate::context::Context;
use crate::error::{FeeError, FeeResult};
use crate::strategy::{CalculationDirection, CalculationResult, strategy_name};

/// Where a step reads its input amount from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainStepInputSource {
    /// The chain's initial amount; only valid for the first step.
    Initial,
    /// The previous step's selected output.
    PreviousOutput,
    /// The previous step's base amount.
    PreviousBase,
    /// The previous step's total amount.
    PreviousTotal,
    /// The previous step's fee amount.
    PreviousFee,
}

impl ChainStepInputSource {
    /// Returns the SCREAMING_SNAKE_CASE name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::PreviousOutput => "PREVIOUS_OUTPUT",
            Self::PreviousBase => "PREVIOUS_BASE",
            Self::PreviousTotal => "PREVIOUS_TOTAL",
            Self::PreviousFee => "PREVIOUS_FEE",
        }
    }
}

impl fmt::Display for ChainStepInputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which facet of a step's result becomes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainResultSelection {
    /// The base amount.
    Base,
    /// The total amount.
    Total,
    /// The fee amount.
    Fee,
}

impl ChainResultSelection {
    /// Picks the selected amount out of a result.
    #[must_use]
    pub const fn select(self, result: &CalculationResult) -> &Amount {
        match self {
            Self::Base => result.base_amount(),
            Self::Total => result.total_amount(),
            Self::Fee => result.fee_amount(),
        }
    }
}

/// One step of a calculation chain.
///
/// Defaults: input [`ChainStepInputSource::PreviousOutput`], output
/// [`ChainResultSelection::Total`], empty context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStep {
    identifier: String,
    strategy: String,
    direction: CalculationDirection,
    input: ChainStepInputSource,
    output: ChainResultSelection,
    context: Context,
}

impl ChainStep {
    /// Creates a step. Identifier and strategy name are trimmed and must not
    /// be empty.
    pub fn new(
        identifier: impl AsRef<str>,
        strategy: impl AsRef<str>,
        direction: CalculationDirection,
    ) -> FeeResult<Self> {
        let identifier = identifier.as_ref().trim();
        if identifier.is_empty() {
            return Err(FeeError::EmptyStepIdentifier);
        }
        Ok(Self {
            identifier: identifier.to_string(),
            strategy: strategy_name(strategy)?,
            direction,
            input: ChainStepInputSource::PreviousOutput,
            output: ChainResultSelection::Total,
            context: Context::new(),
        })
    }

    /// Sets the input source.
    #[must_use]
    pub fn with_input(mut self, input: ChainStepInputSource) -> Self {
        self.input = input;
        self
    }

    /// Sets the output selection.
    #[must_use]
    pub fn with_output(mut self, output: ChainResultSelection) -> Self {
        self.output = output;
        self
    }

    /// Sets the strategy context.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Returns the step identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the strategy name.
    #[must_use]
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Returns the direction.
    #[must_use]
    pub const fn direction(&self) -> CalculationDirection {
        self.direction
    }

    /// Returns the input source.
    #[must_use]
    pub const fn input(&self) -> ChainStepInputSource {
        self.input
    }

    /// Returns the output selection.
    #[must_use]
    pub const fn output(&self) -> ChainResultSelection {
        self.output
    }

    /// Returns the step context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }
}

/// A validated chain: an initial amount and at least one step.
///
/// The first step reads [`ChainStepInputSource::Initial`]; no later step may.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationChainRequest {
    initial: Amount,
    steps: Vec<ChainStep>,
}

impl CalculationChainRequest {
    /// Validates and creates a chain request.
    pub fn new(initial: Amount, steps: Vec<ChainStep>) -> FeeResult<Self> {
        let Some(first) = steps.first() else {
            return Err(FeeError::EmptyCalculationChain);
        };
        if first.input() != ChainStepInputSource::Initial {
            return Err(FeeError::InvalidFirstStepSource(first.input()));
        }

        if let Some((index, step)) = steps
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, step)| step.input() == ChainStepInputSource::Initial)
        {
            return Err(FeeError::InvalidSubsequentStepSource {
                position: index + 1,
                input: step.input(),
            });
        }

        Ok(Self { initial, steps })
    }

    /// Returns the initial amount.
    #[must_use]
    pub const fn initial(&self) -> &Amount {
        &self.initial
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStepResult {
    step: ChainStep,
    input: Amount,
    result: CalculationResult,
}

impl ChainStepResult {
    /// Creates a step result.
    #[must_use]
    pub const fn new(step: ChainStep, input: Amount, result: CalculationResult) -> Self {
        Self { step, input, result }
    }

    /// Returns the executed step.
    #[must_use]
    pub const fn step(&self) -> &ChainStep {
        &self.step
    }

    /// Returns the resolved input amount.
    #[must_use]
    pub const fn input(&self) -> &Amount {
        &self.input
    }

    /// Returns the strategy result.
    #[must_use]
    pub const fn result(&self) -> &CalculationResult {
        &self.result
    }

    /// Returns the amount selected by the step's output selection.
    #[must_use]
    pub const fn output_amount(&self) -> &Amount {
        self.step.output.select(&self.result)
    }
}

/// Outcome of a whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainResult {
    initial: Amount,
    #[serde(rename = "final")]
    final_amount: Amount,
    steps: Vec<ChainStepResult>,
}

impl ChainResult {
    /// Creates a chain result.
    #[must_use]
    pub const fn new(initial: Amount, final_amount: Amount, steps: Vec<ChainStepResult>) -> Self {
        Self {
            initial,
            final_amount,
            steps,
        }
    }

    /// Returns the (normalized) initial amount.
    #[must_use]
    pub const fn initial(&self) -> &Amount {
        &self.initial
    }

    /// Returns the last step's selected output.
    #[must_use]
    pub const fn final_amount(&self) -> &Amount {
        &self.final_amount
    }

    /// Returns every step result in execution order.
    #[must_use]
    pub fn steps(&self) -> &[ChainStepResult] {
        &self.steps
    }

    /// Returns the last step result.
    #[must_use]
    pub fn last_step(&self) -> Option<&ChainStepResult> {
        self.steps.last()
    }
}
