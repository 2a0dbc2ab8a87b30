//! Checkout order-placement saga.
//!
//! A placed order walks these steps in sequence:
//! 1. Advance the shared load counter
//! 2. Fetch the cart
//! 3. Price each line in the user's currency
//! 4. Compute the (unused) discount
//! 5. Quote and convert shipping
//! 6. Aggregate the total and charge payment
//! 7. Ship
//!
//! Any failure aborts the order; nothing is compensated. Cart clearing and
//! the confirmation email run detached once the order has shipped.

pub mod error;
pub mod orchestrator;
pub mod services;
pub mod state;
pub mod steps;

pub use error::{CheckoutError, ServiceError};
pub use orchestrator::{CheckoutConfig, CheckoutOrchestrator, PlaceOrderRequest};
pub use services::{
    CardType, CartService, CatalogService, Charge, CurrencyService, Dependencies, EmailService,
    InMemoryCartService, InMemoryCatalogService, InMemoryCurrencyService, InMemoryDependencies,
    InMemoryEmailService, InMemoryPaymentService, InMemoryShippingService, PaymentService,
    SentEmail, Shipment, ShippingService,
};
pub use state::CheckoutStep;
