//! Domain layer for the checkout saga.
//!
//! This crate provides the value objects exchanged between the checkout
//! orchestrator and its dependencies:
//! - `Money`, a fixed-point currency amount with exact sum and multiply
//! - Cart and catalog items
//! - Order results and the aggregation of an order total

pub mod cart;
pub mod error;
pub mod money;
pub mod order;

pub use cart::{CartItem, Product, ProductId};
pub use error::MoneyError;
pub use money::{Money, NANOS_PER_UNIT};
pub use order::{Address, CreditCardInfo, OrderItem, OrderResult, order_total};
