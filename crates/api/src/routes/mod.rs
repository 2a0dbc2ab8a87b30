//! HTTP route handlers.

pub mod carts;
pub mod load_counter;
pub mod ops;
pub mod orders;
