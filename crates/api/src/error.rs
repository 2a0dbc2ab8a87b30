//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, ServiceError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Order placement failed.
    Checkout(CheckoutError),
    /// A direct dependency call failed.
    Service(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Service(err) => service_error_to_response(err),
        };
        metrics::counter!("api_error_responses_total", "status" => status.as_str().to_string())
            .increment(1);

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        CheckoutError::InvariantViolation(_) | CheckoutError::CurrencyMismatch { .. } => {
            tracing::error!(error = %err, "checkout invariant violated");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        CheckoutError::DependencyFailure { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    match &err {
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        ServiceError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        ServiceError::DeadlineExceeded(_) => (StatusCode::GATEWAY_TIMEOUT, err.to_string()),
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}
