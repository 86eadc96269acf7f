//! Low-level error types for decimal arithmetic and money values.

use thiserror::Error;

/// Result type alias using `MoneyError`.
pub type MoneyResult<T> = Result<T, MoneyError>;

/// Errors raised by the decimal core and the money value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Input does not match `-?\d+(\.\d+)?`.
    #[error("Value \"{0}\" is not a valid decimal string")]
    NotDecimalString(String),

    /// Reducing the value to the requested scale would change it.
    #[error("Value \"{value}\" cannot be represented with {scale} decimal places without losing precision")]
    PrecisionLoss {
        /// The offending value.
        value: String,
        /// The requested scale.
        scale: u32,
    },

    /// Division by a zero divisor.
    #[error("Division by zero")]
    DivisionByZero,

    /// Scale is outside the range supported by the decimal backend.
    #[error("Scale {0} is outside the supported range 0..=28")]
    InvalidScale(i64),

    /// Scale is negative.
    #[error("Scale cannot be negative, got {0}")]
    NegativeScale(i64),

    /// Currency identifier is empty.
    #[error("Currency identifier cannot be empty")]
    EmptyIdentifier,

    /// Arithmetic attempted across two currencies.
    #[error("Cannot perform {operation} between {left} and {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: String,
        /// Currency of the right operand.
        right: String,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// Currency code is not part of the built-in catalogue.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Value does not fit into 28 significant digits.
    #[error("Value \"{0}\" exceeds the supported decimal precision")]
    DecimalOverflow(String),
}

impl MoneyError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotDecimalString(_) => "NOT_DECIMAL_STRING",
            Self::PrecisionLoss { .. } => "PRECISION_LOSS",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::InvalidScale(_) => "INVALID_SCALE",
            Self::NegativeScale(_) => "NEGATIVE_SCALE",
            Self::EmptyIdentifier => "EMPTY_IDENTIFIER",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            Self::DecimalOverflow(_) => "DECIMAL_OVERFLOW",
        }
    }
}
