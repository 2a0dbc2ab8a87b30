//! Load simulator error types.

use thiserror::Error;

/// Errors raised while delivering a marker notification.
#[derive(Debug, Clone, Error)]
pub enum MarkerError {
    /// The marker sink rejected or could not receive the notification.
    #[error("Marker delivery failed: {0}")]
    Delivery(String),

    /// The HTTP client for the marker sink could not be built.
    #[error("Marker client error: {0}")]
    Client(String),
}
