//! Cart seeding endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::{CorrelationContext, UserId};
use domain::CartItem;
use serde::{Deserialize, Serialize};

use super::orders::{AppState, request_id};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItem>,
}

fn context(state: &AppState, headers: &HeaderMap, user_id: &UserId) -> CorrelationContext {
    CorrelationContext::new(user_id.clone(), request_id(headers), state.build.clone())
}

/// POST /carts/{user_id}/items: add an item to the user's cart.
#[tracing::instrument(skip(state, headers, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AddItemRequest>,
) -> Result<StatusCode, ApiError> {
    if req.quantity == 0 {
        return Err(ApiError::BadRequest("quantity must be positive".to_string()));
    }
    if req.product_id.trim().is_empty() {
        return Err(ApiError::BadRequest("product_id is required".to_string()));
    }

    let user_id = UserId::new(user_id);
    let ctx = context(&state, &headers, &user_id);
    state
        .cart
        .add_item(&ctx, &user_id, CartItem::new(req.product_id, req.quantity))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /carts/{user_id}: the user's cart contents.
#[tracing::instrument(skip(state, headers))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let user_id = UserId::new(user_id);
    let ctx = context(&state, &headers, &user_id);
    let items = state.cart.get_cart(&ctx, &user_id).await?;

    Ok(Json(CartResponse {
        user_id: user_id.to_string(),
        items,
    }))
}
