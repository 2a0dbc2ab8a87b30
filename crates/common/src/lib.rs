//! Shared identifiers, correlation context and background task runner
//! for the checkout services.

pub mod correlation;
pub mod tasks;
pub mod types;

pub use correlation::CorrelationContext;
pub use tasks::BackgroundTasks;
pub use types::{BuildTag, OrderId, RequestId, UserId};
