//! Shipping service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CorrelationContext;
use domain::{Address, CartItem, Money};
use rand::Rng;

use crate::error::ServiceError;

/// Trait for shipping quotes and shipments.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Quotes the cost of shipping `items` to `address`, in USD.
    async fn get_quote(
        &self,
        ctx: &CorrelationContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ServiceError>;

    /// Ships `items` to `address` and returns the tracking id.
    async fn ship_order(
        &self,
        ctx: &CorrelationContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ServiceError>;
}

/// A shipment accepted by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    pub tracking_id: String,
    pub address: Address,
    pub items: Vec<CartItem>,
}

#[derive(Debug)]
struct InMemoryShippingState {
    flat_quote: Money,
    shipments: Vec<Shipment>,
    fail_on_quote: bool,
    fail_on_ship: bool,
    quote_calls: usize,
}

/// In-memory shipping service with a flat quote.
#[derive(Debug, Clone)]
pub struct InMemoryShippingService {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShippingService {
    /// Creates a shipping service that quotes `flat_quote` for every order.
    pub fn new(flat_quote: Money) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryShippingState {
                flat_quote,
                shipments: Vec::new(),
                fail_on_quote: false,
                fail_on_ship: false,
                quote_calls: 0,
            })),
        }
    }

    /// Configures the service to fail on get_quote calls.
    pub fn set_fail_on_quote(&self, fail: bool) {
        self.state.write().unwrap().fail_on_quote = fail;
    }

    /// Configures the service to fail on ship_order calls.
    pub fn set_fail_on_ship(&self, fail: bool) {
        self.state.write().unwrap().fail_on_ship = fail;
    }

    /// Returns the shipments accepted so far.
    pub fn shipments(&self) -> Vec<Shipment> {
        self.state.read().unwrap().shipments.clone()
    }

    pub fn quote_calls(&self) -> usize {
        self.state.read().unwrap().quote_calls
    }
}

impl Default for InMemoryShippingService {
    /// Quotes 8.99 USD.
    fn default() -> Self {
        Self::new(Money::new("USD", 8, 990_000_000).expect("8.99 USD is a valid amount"))
    }
}

/// Generates a tracking id shaped like `AB-1234567-8901234`.
pub fn generate_tracking_id<R: Rng>(rng: &mut R) -> String {
    let letters: String = (0..2)
        .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
        .collect();
    format!(
        "{letters}-{:07}-{:07}",
        rng.gen_range(0..10_000_000u32),
        rng.gen_range(0..10_000_000u32)
    )
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn get_quote(
        &self,
        _ctx: &CorrelationContext,
        _address: &Address,
        _items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.quote_calls += 1;

        if state.fail_on_quote {
            return Err(ServiceError::Unavailable("shipping quote unavailable".to_string()));
        }

        Ok(state.flat_quote.clone())
    }

    async fn ship_order(
        &self,
        _ctx: &CorrelationContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ServiceError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_ship {
            return Err(ServiceError::Unavailable("carrier rejected shipment".to_string()));
        }

        let tracking_id = generate_tracking_id(&mut rand::thread_rng());
        state.shipments.push(Shipment {
            tracking_id: tracking_id.clone(),
            address: address.clone(),
            items: items.to_vec(),
        });
        Ok(tracking_id)
    }
}
