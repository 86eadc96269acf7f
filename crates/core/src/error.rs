//! Fee engine error types.
//!
//! Every failure is caller-surfaced: there are no retries and no partial
//! results. Errors carry the offending field, value, and (for chains) the
//! 1-based step position.

use feecalc_shared::MoneyError;
use thiserror::Error;

use crate::chain::ChainStepInputSource;
use crate::strategy::CalculationDirection;

/// Result type alias using `FeeError`.
pub type FeeResult<T> = Result<T, FeeError>;

/// Errors that can occur while calculating fees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    // ========== Input Validation ==========
    /// Strategy name is empty after trimming.
    #[error("Strategy name cannot be empty")]
    EmptyStrategyName,

    /// Amount string is not a valid decimal.
    #[error("Invalid amount format: \"{0}\"")]
    InvalidAmountFormat(String),

    /// Chain step identifier is empty after trimming.
    #[error("Chain step identifier cannot be empty")]
    EmptyStepIdentifier,

    /// Context value has the wrong type.
    #[error("Context value \"{key}\" must be {expected}")]
    InvalidContextValue {
        /// Context key.
        key: String,
        /// Expected value type.
        expected: &'static str,
    },

    // ========== Fee Domain ==========
    /// Percentage is malformed or outside [0, 1].
    #[error("Invalid percentage \"{0}\": expected a decimal fraction between 0 and 1")]
    InvalidPercentage(String),

    /// Amount must be positive (or non-negative for fixed fees).
    #[error("Amount {amount} {currency} must be positive")]
    AmountNotPositive {
        /// Offending amount.
        amount: String,
        /// Currency of the amount.
        currency: String,
    },

    // ========== Strategy Dispatch ==========
    /// No strategy registered under the name.
    #[error("Fee strategy \"{0}\" is not registered")]
    StrategyNotFound(String),

    /// Strategy cannot calculate in the requested direction.
    #[error("Fee strategy \"{strategy}\" does not support {direction} calculation")]
    UnsupportedDirection {
        /// Strategy name.
        strategy: String,
        /// Requested direction.
        direction: CalculationDirection,
    },

    /// Composite strategy built without children.
    #[error("Composite strategy \"{0}\" requires at least one strategy")]
    InvalidComposite(String),

    // ========== Chain Structure ==========
    /// Chain request has no steps.
    #[error("Calculation chain must contain at least one step")]
    EmptyCalculationChain,

    /// First step does not read the initial amount.
    #[error("First chain step must use INITIAL input, got {0}")]
    InvalidFirstStepSource(ChainStepInputSource),

    /// A later step reads the initial amount.
    #[error("Chain step {position} cannot use {input} input")]
    InvalidSubsequentStepSource {
        /// 1-based step position.
        position: usize,
        /// Offending input source.
        input: ChainStepInputSource,
    },

    /// Previous step produced no output.
    #[error("Chain step {position} requires the previous step output, but none is available")]
    MissingPreviousOutput {
        /// 1-based step position.
        position: usize,
    },

    /// Previous step produced no result.
    #[error("Chain step {position} requires {input} from the previous step, but no result is available")]
    MissingPreviousResult {
        /// 1-based step position.
        position: usize,
        /// Requested input source.
        input: ChainStepInputSource,
    },

    /// Step result currency diverged from the initial amount's currency.
    #[error("Chain step {position} produced {actual}, expected {expected}")]
    MismatchedStepCurrency {
        /// 1-based step position.
        position: usize,
        /// Currency of the initial amount.
        expected: String,
        /// Currency found in the step.
        actual: String,
    },

    // ========== Composite Solver ==========
    /// Requested total is below what fixed fees alone produce.
    #[error("Total {total} is lower than the minimal composite total {minimal}")]
    BelowMinimalTotal {
        /// Requested total.
        total: String,
        /// Composite total at a zero base.
        minimal: String,
    },

    // ========== Decimal / Money ==========
    /// Decimal arithmetic or money value error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl FeeError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyStrategyName => "EMPTY_STRATEGY_NAME",
            Self::InvalidAmountFormat(_) => "INVALID_AMOUNT_FORMAT",
            Self::EmptyStepIdentifier => "EMPTY_STEP_IDENTIFIER",
            Self::InvalidContextValue { .. } => "INVALID_CONTEXT_VALUE",
            Self::InvalidPercentage(_) => "INVALID_PERCENTAGE",
            Self::AmountNotPositive { .. } => "AMOUNT_NOT_POSITIVE",
            Self::StrategyNotFound(_) => "STRATEGY_NOT_FOUND",
            Self::UnsupportedDirection { .. } => "UNSUPPORTED_DIRECTION",
            Self::InvalidComposite(_) => "INVALID_COMPOSITE",
            Self::EmptyCalculationChain => "EMPTY_CALCULATION_CHAIN",
            Self::InvalidFirstStepSource(_) => "INVALID_FIRST_STEP_SOURCE",
            Self::InvalidSubsequentStepSource { .. } => "INVALID_SUBSEQUENT_STEP_SOURCE",
            Self::MissingPreviousOutput { .. } => "MISSING_PREVIOUS_OUTPUT",
            Self::MissingPreviousResult { .. } => "MISSING_PREVIOUS_RESULT",
            Self::MismatchedStepCurrency { .. } => "MISMATCHED_STEP_CURRENCY",
            Self::BelowMinimalTotal { .. } => "BELOW_MINIMAL_TOTAL",
            Self::Money(err) => err.error_code(),
        }
    }
}
