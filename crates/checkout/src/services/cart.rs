//! Cart service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CorrelationContext, UserId};
use domain::CartItem;

use crate::error::ServiceError;

/// Trait for shopping cart operations.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Adds an item to the user's cart, merging quantities per product.
    async fn add_item(
        &self,
        ctx: &CorrelationContext,
        user_id: &UserId,
        item: CartItem,
    ) -> Result<(), ServiceError>;

    /// Returns the user's cart. A user without a cart has an empty one.
    async fn get_cart(
        &self,
        ctx: &CorrelationContext,
        user_id: &UserId,
    ) -> Result<Vec<CartItem>, ServiceError>;

    /// Removes every item from the user's cart.
    async fn empty_cart(&self, ctx: &CorrelationContext, user_id: &UserId)
    -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    carts: HashMap<UserId, Vec<CartItem>>,
    fail_on_get: bool,
    fail_on_empty: bool,
    get_calls: usize,
    empty_calls: usize,
}

/// In-memory cart service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartService {
    /// Creates a new in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on get_cart calls.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state.write().unwrap().fail_on_get = fail;
    }

    /// Configures the service to fail on empty_cart calls.
    pub fn set_fail_on_empty(&self, fail: bool) {
        self.state.write().unwrap().fail_on_empty = fail;
    }

    /// Returns the stored items for a user without going through the trait.
    pub fn items(&self, user_id: &UserId) -> Vec<CartItem> {
        self.state
            .read()
            .unwrap()
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_calls(&self) -> usize {
        self.state.read().unwrap().get_calls
    }

    pub fn empty_calls(&self) -> usize {
        self.state.read().unwrap().empty_calls
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn add_item(
        &self,
        _ctx: &CorrelationContext,
        user_id: &UserId,
        item: CartItem,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        let cart = state.carts.entry(user_id.clone()).or_default();
        match cart.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| {
                        ServiceError::InvalidArgument(format!(
                            "quantity for {} exceeds {}",
                            item.product_id,
                            u32::MAX
                        ))
                    })?;
            }
            None => cart.push(item),
        }
        Ok(())
    }

    async fn get_cart(
        &self,
        _ctx: &CorrelationContext,
        user_id: &UserId,
    ) -> Result<Vec<CartItem>, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.get_calls += 1;

        if state.fail_on_get {
            return Err(ServiceError::Unavailable("cart store unreachable".to_string()));
        }

        Ok(state.carts.get(user_id).cloned().unwrap_or_default())
    }

    async fn empty_cart(
        &self,
        _ctx: &CorrelationContext,
        user_id: &UserId,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state.empty_calls += 1;

        if state.fail_on_empty {
            return Err(ServiceError::Unavailable("cart store unreachable".to_string()));
        }

        state.carts.insert(user_id.clone(), Vec::new());
        Ok(())
    }
}
