//! Dependency service traits and in-memory implementations.

pub mod cart;
pub mod catalog;
pub mod currency;
pub mod email;
pub mod payment;
pub mod shipping;

use std::sync::Arc;

pub use cart::{CartService, InMemoryCartService};
pub use catalog::{CatalogService, InMemoryCatalogService};
pub use currency::{CurrencyService, InMemoryCurrencyService};
pub use email::{EmailService, InMemoryEmailService, SentEmail, render_confirmation};
pub use payment::{CardType, Charge, InMemoryPaymentService, PaymentService, validate_card};
pub use shipping::{InMemoryShippingService, Shipment, ShippingService};

/// The six services an order placement talks to.
#[derive(Clone)]
pub struct Dependencies {
    pub cart: Arc<dyn CartService>,
    pub catalog: Arc<dyn CatalogService>,
    pub currency: Arc<dyn CurrencyService>,
    pub shipping: Arc<dyn ShippingService>,
    pub payment: Arc<dyn PaymentService>,
    pub email: Arc<dyn EmailService>,
}

/// In-memory services kept with their concrete types, so tests and the
/// demo server can seed data and inspect calls.
#[derive(Debug, Clone)]
pub struct InMemoryDependencies {
    pub cart: InMemoryCartService,
    pub catalog: InMemoryCatalogService,
    pub currency: InMemoryCurrencyService,
    pub shipping: InMemoryShippingService,
    pub payment: InMemoryPaymentService,
    pub email: InMemoryEmailService,
}

impl InMemoryDependencies {
    /// Demo catalog, default rates and the flat shipping quote.
    pub fn demo() -> Self {
        Self {
            cart: InMemoryCartService::new(),
            catalog: InMemoryCatalogService::demo(),
            currency: InMemoryCurrencyService::with_default_rates(),
            shipping: InMemoryShippingService::default(),
            payment: InMemoryPaymentService::new(),
            email: InMemoryEmailService::new(),
        }
    }

    /// Returns trait-object handles sharing state with these services.
    pub fn as_dependencies(&self) -> Dependencies {
        Dependencies {
            cart: Arc::new(self.cart.clone()),
            catalog: Arc::new(self.catalog.clone()),
            currency: Arc::new(self.currency.clone()),
            shipping: Arc::new(self.shipping.clone()),
            payment: Arc::new(self.payment.clone()),
            email: Arc::new(self.email.clone()),
        }
    }
}
