//! Email service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CorrelationContext;
use domain::OrderResult;

use crate::error::ServiceError;

/// Trait for sending order confirmations.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_order_confirmation(
        &self,
        ctx: &CorrelationContext,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError>;
}

/// Renders the plain-text body of a confirmation email.
pub fn render_confirmation(order: &OrderResult) -> String {
    let mut body = format!(
        "Your order is complete!\n\nOrder ID: {}\nShipping tracking ID: {}\nShipping cost: {}\n\nItems:\n",
        order.order_id, order.shipping_tracking_id, order.shipping_cost
    );
    for line in &order.items {
        body.push_str(&format!(
            "  {} x{} @ {}\n",
            line.item.product_id, line.item.quantity, line.cost
        ));
    }
    let address = &order.shipping_address;
    body.push_str(&format!(
        "\nShipping to:\n  {}\n  {}, {} {}\n  {}\n",
        address.street_address, address.city, address.state, address.zip_code, address.country
    ));
    body
}

/// A confirmation recorded by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct InMemoryEmailState {
    sent: Vec<SentEmail>,
    fail_on_send: bool,
}

/// In-memory email service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailService {
    state: Arc<RwLock<InMemoryEmailState>>,
}

impl InMemoryEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns every confirmation sent so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns the confirmations sent to one address.
    pub fn sent_to(&self, email: &str) -> Vec<SentEmail> {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .filter(|m| m.to == email)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmailService for InMemoryEmailService {
    async fn send_order_confirmation(
        &self,
        _ctx: &CorrelationContext,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(ServiceError::Unavailable("smtp relay unreachable".to_string()));
        }

        state.sent.push(SentEmail {
            to: email.to_string(),
            body: render_confirmation(order),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BuildTag, OrderId, RequestId, UserId};
    use domain::{Address, CartItem, Money, OrderItem};

    fn ctx() -> CorrelationContext {
        CorrelationContext::new(UserId::new("u1"), RequestId::generate(), BuildTag::new("test"))
    }

    fn order() -> OrderResult {
        OrderResult {
            order_id: OrderId::new(),
            shipping_tracking_id: "AB-1234567-8901234".to_string(),
            shipping_cost: Money::new("USD", 3, 0).unwrap(),
            shipping_address: Address {
                street_address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                country: "USA".to_string(),
                zip_code: 62701,
            },
            items: vec![OrderItem::new(
                CartItem::new("productA", 2),
                Money::new("USD", 10, 0).unwrap(),
            )],
        }
    }

    #[test]
    fn test_render_confirmation() {
        let order = order();
        let body = render_confirmation(&order);

        assert!(body.contains(&order.order_id.to_string()));
        assert!(body.contains("AB-1234567-8901234"));
        assert!(body.contains("productA x2 @ 10.00 USD"));
        assert!(body.contains("Springfield, IL 62701"));
    }

    #[tokio::test]
    async fn test_send_records_per_address() {
        let service = InMemoryEmailService::new();
        service
            .send_order_confirmation(&ctx(), "a@example.com", &order())
            .await
            .unwrap();
        service
            .send_order_confirmation(&ctx(), "b@example.com", &order())
            .await
            .unwrap();

        assert_eq!(service.sent().len(), 2);
        assert_eq!(service.sent_to("a@example.com").len(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_send() {
        let service = InMemoryEmailService::new();
        service.set_fail_on_send(true);

        let result = service
            .send_order_confirmation(&ctx(), "a@example.com", &order())
            .await;
        assert!(result.is_err());
        assert!(service.sent().is_empty());
    }
}
