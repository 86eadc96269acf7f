//! Sequential execution of calculation chains.

use feecalc_shared::Amount;
use tracing::debug;

use super::types::{CalculationChainRequest, ChainResult, ChainStep, ChainStepInputSource, ChainStepResult};
use crate::engine::FeeEngine;
use crate::error::{FeeError, FeeResult};
use crate::strategy::{CalculationRequest, CalculationResult};

/// Runs chain requests against an engine.
///
/// Every step must stay in the initial amount's currency.
#[derive(Debug, Clone, Copy)]
pub struct FeeCalculationChain<'a> {
    engine: &'a FeeEngine,
}

impl<'a> FeeCalculationChain<'a> {
    /// Creates a chain runner.
    #[must_use]
    pub const fn new(engine: &'a FeeEngine) -> Self {
        Self { engine }
    }

    /// Executes every step in order.
    ///
    /// Fails on the first step error; no partial result is returned.
    pub fn calculate(&self, request: &CalculationChainRequest) -> FeeResult<ChainResult> {
        let initial = self.engine.normalize_amount(request.initial());
        let mut previous_result: Option<CalculationResult> = None;
        let mut previous_output: Option<Amount> = None;
        let mut steps = Vec::with_capacity(request.steps().len());

        for (index, step) in request.steps().iter().enumerate() {
            let position = index + 1;
            let input = Self::resolve_input(
                step,
                position,
                &initial,
                previous_result.as_ref(),
                previous_output.as_ref(),
            )?;
            let input = self.engine.normalize_amount(&input);

            let calculation = CalculationRequest::new(
                step.strategy(),
                step.direction(),
                input.clone(),
                step.context().clone(),
            )?;
            let result = self.engine.calculate(&calculation)?;
            ensure_currency(position, &initial, &input, &result)?;

            let output = step.output().select(&result).clone();
            debug!(
                step = %step.identifier(),
                position,
                strategy = %step.strategy(),
                input_source = %step.input(),
                input = %input,
                output = %output,
                "executed chain step"
            );

            previous_output = Some(output);
            previous_result = Some(result.clone());
            steps.push(ChainStepResult::new(step.clone(), input, result));
        }

        let final_amount = previous_output.unwrap_or_else(|| initial.clone());
        Ok(ChainResult::new(initial, final_amount, steps))
    }

    /// Resolves the input amount of the step at 1-based `position`.
    pub(crate) fn resolve_input(
        step: &ChainStep,
        position: usize,
        initial: &Amount,
        previous_result: Option<&CalculationResult>,
        previous_output: Option<&Amount>,
    ) -> FeeResult<Amount> {
        let from_result = |select: fn(&CalculationResult) -> &Amount| {
            previous_result
                .map(|result| select(result).clone())
                .ok_or(FeeError::MissingPreviousResult {
                    position,
                    input: step.input(),
                })
        };

        match step.input() {
            ChainStepInputSource::Initial => Ok(initial.clone()),
            ChainStepInputSource::PreviousOutput => previous_output
                .cloned()
                .ok_or(FeeError::MissingPreviousOutput { position }),
            ChainStepInputSource::PreviousBase => from_result(CalculationResult::base_amount),
            ChainStepInputSource::PreviousTotal => from_result(CalculationResult::total_amount),
            ChainStepInputSource::PreviousFee => from_result(CalculationResult::fee_amount),
        }
    }
}

fn ensure_currency(
    position: usize,
    initial: &Amount,
    input: &Amount,
    result: &CalculationResult,
) -> FeeResult<()> {
    let expected = initial.currency();
    let mismatch = [input.currency(), result.currency()]
        .into_iter()
        .find(|currency| *currency != expected);

    match mismatch {
        Some(actual) => Err(FeeError::MismatchedStepCurrency {
            position,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }),
        None => Ok(()),
    }
}
