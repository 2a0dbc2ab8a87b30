//! Product catalog service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CorrelationContext;
use domain::{Money, Product, ProductId};

use crate::error::ServiceError;

/// Trait for catalog lookups.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Returns the product with its USD price.
    async fn get_product(
        &self,
        ctx: &CorrelationContext,
        id: &ProductId,
    ) -> Result<Product, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    fail_on_get: bool,
    lookups: usize,
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog stocked with the demo shop's products.
    pub fn demo() -> Self {
        let catalog = Self::new();
        let products: [(&str, &str, i64, i32); 9] = [
            ("OLJCESPC7Z", "Vintage Typewriter", 67, 990_000_000),
            ("66VCHSJNUP", "Vintage Camera Lens", 12, 490_000_000),
            ("1YMWWN1N4O", "Home Barista Kit", 124, 0),
            ("L9ECAV7KIM", "Terrarium", 36, 450_000_000),
            ("2ZYFJ3GM2N", "Film Camera", 2, 245_000_000),
            ("0PUK6V6EV0", "Vintage Record Player", 65, 500_000_000),
            ("LS4PSXUNUM", "Metal Camping Mug", 24, 330_000_000),
            ("9SIQT8TOJO", "City Bike", 789, 500_000_000),
            ("6E92ZMYYFZ", "Air Plant", 12, 300_000_000),
        ];
        for (id, name, units, nanos) in products {
            if let Ok(price) = Money::new("USD", units, nanos) {
                catalog.insert(Product::new(id, name, price));
            }
        }
        catalog
    }

    /// Adds or replaces a product.
    pub fn insert(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id.clone(), product);
    }

    /// Configures the service to fail on every lookup.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state.write().unwrap().fail_on_get = fail;
    }

    pub fn product_count(&self) -> usize {
        self.state.read().unwrap().products.len()
    }

    pub fn lookups(&self) -> usize {
        self.state.read().unwrap().lookups
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_product(
        &self,
        _ctx: &CorrelationContext,
        id: &ProductId,
    ) -> Result<Product, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.lookups += 1;

        if state.fail_on_get {
            return Err(ServiceError::Unavailable("catalog unreachable".to_string()));
        }

        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("no product with ID {id}")))
    }
}
