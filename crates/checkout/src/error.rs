//! Checkout error types.

use std::time::Duration;

use domain::MoneyError;
use thiserror::Error;

/// Errors returned by dependency services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service could not be reached or refused the call.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was rejected by the service's validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The call did not complete within its timeout.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

/// Errors that abort an order placement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// A synchronous dependency call failed.
    #[error("{step} failed: {cause}")]
    DependencyFailure {
        step: &'static str,
        cause: ServiceError,
    },

    /// Shipping failed after the payment went through.
    #[error("shipping error: {0}")]
    Unavailable(ServiceError),

    /// An internal invariant did not hold.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl CheckoutError {
    /// Short label identifying where the saga stopped.
    pub fn step(&self) -> &'static str {
        match self {
            CheckoutError::CurrencyMismatch { .. } => "aggregate_total",
            CheckoutError::DependencyFailure { step, .. } => step,
            CheckoutError::Unavailable(_) => crate::steps::STEP_SHIP_ORDER,
            CheckoutError::InvariantViolation(_) => "invariant",
        }
    }
}

impl From<MoneyError> for CheckoutError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::CurrencyMismatch { expected, actual } => {
                CheckoutError::CurrencyMismatch { expected, actual }
            }
            other => CheckoutError::InvariantViolation(other.to_string()),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
