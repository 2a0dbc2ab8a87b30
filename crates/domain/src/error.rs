//! Domain error types.

use thiserror::Error;

/// Errors that can occur while building or combining money amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// Units and nanos violate the sign or magnitude invariant.
    #[error("Invalid money value: units={units}, nanos={nanos}")]
    InvalidValue { units: i64, nanos: i32 },

    /// Currency code is not a three-letter ISO code.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    /// The result does not fit in 64-bit units.
    #[error("Money arithmetic overflow")]
    Overflow,
}
