//! Order placement value objects.

use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::error::MoneyError;
use crate::money::Money;

/// Shipping destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: i32,
}

/// Payment instrument supplied by the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardInfo {
    pub credit_card_number: String,
    pub credit_card_cvv: i32,
    pub credit_card_expiration_year: i32,
    pub credit_card_expiration_month: u32,
}

impl CreditCardInfo {
    /// Returns the last four digits of the card number, ignoring separators.
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self
            .credit_card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

/// A priced cart line: the original item plus its localized unit cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item: CartItem,
    pub cost: Money,
}

impl OrderItem {
    pub fn new(item: CartItem, cost: Money) -> Self {
        Self { item, cost }
    }

    /// Returns `cost * quantity`.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.cost.multiply(self.item.quantity)
    }
}

/// Outcome of a successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub shipping_tracking_id: String,
    pub shipping_cost: Money,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,
}

/// Aggregates the amount to charge: zero, plus shipping, plus every line
/// total. All amounts must already be in `currency_code`.
pub fn order_total(
    currency_code: &str,
    shipping_cost: &Money,
    items: &[OrderItem],
) -> Result<Money, MoneyError> {
    let mut total = Money::zero(currency_code)?.sum(shipping_cost)?;
    for item in items {
        total = total.sum(&item.line_total()?)?;
    }
    Ok(total)
}
