//! Payment service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use common::CorrelationContext;
use domain::{CreditCardInfo, Money};
use uuid::Uuid;

use crate::error::ServiceError;

/// Trait for charging payment instruments.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges `amount` to the card and returns the transaction id.
    async fn charge(
        &self,
        ctx: &CorrelationContext,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<String, ServiceError>;
}

/// Card networks recognised from the number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Visa,
    MasterCard,
    Amex,
    Discover,
    Unknown,
}

impl CardType {
    /// Detects the network from the number's prefix and length.
    pub fn detect(digits: &str) -> Self {
        let prefix = |n: usize| digits.get(..n).and_then(|p| p.parse::<u32>().ok());
        let len = digits.len();

        if digits.starts_with('4') && matches!(len, 13 | 16 | 19) {
            CardType::Visa
        } else if len == 16
            && (prefix(2).is_some_and(|p| (51..=55).contains(&p))
                || prefix(4).is_some_and(|p| (2221..=2720).contains(&p)))
        {
            CardType::MasterCard
        } else if len == 15 && prefix(2).is_some_and(|p| p == 34 || p == 37) {
            CardType::Amex
        } else if len == 16 && (digits.starts_with("6011") || digits.starts_with("65")) {
            CardType::Discover
        } else {
            CardType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Visa => "visa",
            CardType::MasterCard => "mastercard",
            CardType::Amex => "amex",
            CardType::Discover => "discover",
            CardType::Unknown => "unknown",
        }
    }
}

/// Returns true if the digit string passes the Luhn checksum.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Validates a card as of `today`.
///
/// Dashes and spaces in the number are ignored. Only VISA and MasterCard
/// are accepted, and the card must not expire before the current month.
pub fn validate_card(card: &CreditCardInfo, today: NaiveDate) -> Result<CardType, ServiceError> {
    let digits: String = card
        .credit_card_number
        .chars()
        .filter(|c| *c != '-' && *c != ' ')
        .collect();

    if !luhn_valid(&digits) {
        return Err(ServiceError::InvalidArgument(
            "Credit card info is invalid".to_string(),
        ));
    }

    let card_type = CardType::detect(&digits);
    if !matches!(card_type, CardType::Visa | CardType::MasterCard) {
        return Err(ServiceError::InvalidArgument(format!(
            "Sorry, we cannot process {} credit cards. Only VISA or MasterCard is accepted.",
            card_type.as_str()
        )));
    }

    let current = i64::from(today.year()) * 12 + i64::from(today.month());
    let expires = i64::from(card.credit_card_expiration_year) * 12
        + i64::from(card.credit_card_expiration_month);
    if current > expires {
        return Err(ServiceError::InvalidArgument(format!(
            "Your credit card (ending {}) expired on {}/{}",
            card.last_four(),
            card.credit_card_expiration_month,
            card.credit_card_expiration_year
        )));
    }

    Ok(card_type)
}

/// A charge accepted by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    pub transaction_id: String,
    pub amount: Money,
    pub card_type: CardType,
    pub last_four: String,
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    charges: Vec<Charge>,
    fail_on_charge: bool,
    charge_calls: usize,
}

/// In-memory payment service. Validates cards and records charges.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline every charge.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap().fail_on_charge = fail;
    }

    /// Returns the accepted charges.
    pub fn charges(&self) -> Vec<Charge> {
        self.state.read().unwrap().charges.clone()
    }

    /// Number of charge attempts, accepted or not.
    pub fn charge_calls(&self) -> usize {
        self.state.read().unwrap().charge_calls
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn charge(
        &self,
        _ctx: &CorrelationContext,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<String, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.charge_calls += 1;

        if state.fail_on_charge {
            return Err(ServiceError::Unavailable("Payment declined".to_string()));
        }

        let card_type = validate_card(card, Utc::now().date_naive())?;
        let transaction_id = Uuid::new_v4().to_string();

        tracing::info!(
            card_type = card_type.as_str(),
            last_four = %card.last_four(),
            amount = %amount,
            "Transaction processed"
        );

        state.charges.push(Charge {
            transaction_id: transaction_id.clone(),
            amount: amount.clone(),
            card_type,
            last_four: card.last_four(),
        });
        Ok(transaction_id)
    }
}
