//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use checkout::{CartService, CheckoutOrchestrator, PlaceOrderRequest};
use common::{BuildTag, CorrelationContext, RequestId, UserId};
use domain::{Address, CreditCardInfo, OrderResult};
use serde::Deserialize;

use crate::error::ApiError;

/// Header carrying the front door's request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: Arc<CheckoutOrchestrator>,
    pub cart: Arc<dyn CartService>,
    pub build: BuildTag,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct PlaceOrderBody {
    pub user_id: String,
    pub user_currency: String,
    pub address: Address,
    pub email: String,
    pub credit_card: CreditCardInfo,
}

// -- Handlers --

/// POST /orders: place an order for the user's current cart.
#[tracing::instrument(skip(state, headers, body), fields(user_id = %body.user_id))]
pub async fn place(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<PlaceOrderBody>,
) -> Result<Json<OrderResult>, ApiError> {
    if body.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }
    if body.user_currency.len() != 3 {
        return Err(ApiError::BadRequest(format!(
            "invalid currency code {:?}",
            body.user_currency
        )));
    }

    let user_id = UserId::new(body.user_id);
    let ctx = CorrelationContext::new(user_id.clone(), request_id(&headers), state.build.clone());

    let request = PlaceOrderRequest {
        user_id,
        user_currency: body.user_currency,
        address: body.address,
        email: body.email,
        credit_card: body.credit_card,
    };

    let order = state.orchestrator.place_order(&ctx, request).await?;
    Ok(Json(order))
}

/// Request id from the `x-request-id` header, or a fresh one.
pub(crate) fn request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(RequestId::new)
        .unwrap_or_else(RequestId::generate)
}
