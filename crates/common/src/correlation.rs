//! Correlation context threaded through every saga step and outbound call.

use serde::{Deserialize, Serialize};

use crate::types::{BuildTag, OrderId, RequestId, UserId};

/// Metadata keys attached to outbound calls.
pub const USER_ID_KEY: &str = "userid";
pub const REQUEST_ID_KEY: &str = "requestID";
pub const BUILD_KEY: &str = "build";
pub const ORDER_ID_KEY: &str = "orderid";

/// Out-of-band identifiers carried alongside a request.
///
/// The order id is absent until the orchestrator assigns one; follow-up
/// work detached from the request receives a clone of the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationContext {
    pub user_id: UserId,
    pub request_id: RequestId,
    pub build: BuildTag,
    pub order_id: Option<OrderId>,
}

impl CorrelationContext {
    pub fn new(user_id: UserId, request_id: RequestId, build: BuildTag) -> Self {
        Self {
            user_id,
            request_id,
            build,
            order_id: None,
        }
    }

    /// Returns a copy of this context carrying the given order id.
    pub fn with_order(&self, order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            ..self.clone()
        }
    }

    /// Flattens the context into key/value metadata pairs.
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (USER_ID_KEY, self.user_id.to_string()),
            (REQUEST_ID_KEY, self.request_id.to_string()),
            (BUILD_KEY, self.build.to_string()),
        ];
        if let Some(order_id) = self.order_id {
            pairs.push((ORDER_ID_KEY, order_id.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CorrelationContext {
        CorrelationContext::new(
            UserId::new("user-1"),
            RequestId::new("req-1"),
            BuildTag::new("c0ffee00"),
        )
    }

    #[test]
    fn metadata_omits_order_until_assigned() {
        let ctx = context();
        let keys: Vec<_> = ctx.metadata().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![USER_ID_KEY, REQUEST_ID_KEY, BUILD_KEY]);
    }

    #[test]
    fn with_order_keeps_other_fields() {
        let ctx = context();
        let order_id = OrderId::new();
        let scoped = ctx.with_order(order_id);

        assert_eq!(scoped.user_id, ctx.user_id);
        assert_eq!(scoped.request_id, ctx.request_id);
        assert_eq!(scoped.order_id, Some(order_id));
        assert!(ctx.order_id.is_none());
        assert!(
            scoped
                .metadata()
                .contains(&(ORDER_ID_KEY, order_id.to_string()))
        );
    }
}
