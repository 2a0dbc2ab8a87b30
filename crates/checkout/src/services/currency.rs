//! Currency conversion service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CorrelationContext;
use domain::Money;

use crate::error::ServiceError;

/// Trait for converting amounts between currencies.
#[async_trait]
pub trait CurrencyService: Send + Sync {
    /// Converts `from` into `to_code`. Converting into the same currency
    /// returns the amount unchanged.
    async fn convert(
        &self,
        ctx: &CorrelationContext,
        from: &Money,
        to_code: &str,
    ) -> Result<Money, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCurrencyState {
    /// Nanos of each currency per one EUR.
    rates: HashMap<String, i128>,
    fail_on_convert: bool,
    conversions: usize,
}

/// In-memory currency converter backed by a fixed EUR rate table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCurrencyService {
    state: Arc<RwLock<InMemoryCurrencyState>>,
}

impl InMemoryCurrencyService {
    /// Creates a converter with no rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter loaded with a static snapshot of EUR rates.
    pub fn with_default_rates() -> Self {
        let service = Self::new();
        let rates: [(&str, i128); 10] = [
            ("EUR", 1_000_000_000),
            ("USD", 1_130_500_000),
            ("JPY", 126_400_000_000),
            ("GBP", 859_700_000),
            ("CAD", 1_512_800_000),
            ("CHF", 1_138_200_000),
            ("AUD", 1_599_300_000),
            ("SEK", 10_558_000_000),
            ("PLN", 4_283_600_000),
            ("INR", 79_869_000_000),
        ];
        for (code, nanos_per_eur) in rates {
            service.set_rate(code, nanos_per_eur);
        }
        service
    }

    /// Sets the rate for a currency as nanos per one EUR.
    pub fn set_rate(&self, code: &str, nanos_per_eur: i128) {
        self.state
            .write()
            .unwrap()
            .rates
            .insert(code.to_string(), nanos_per_eur);
    }

    /// Configures the service to fail on every conversion.
    pub fn set_fail_on_convert(&self, fail: bool) {
        self.state.write().unwrap().fail_on_convert = fail;
    }

    pub fn conversions(&self) -> usize {
        self.state.read().unwrap().conversions
    }
}

#[async_trait]
impl CurrencyService for InMemoryCurrencyService {
    async fn convert(
        &self,
        _ctx: &CorrelationContext,
        from: &Money,
        to_code: &str,
    ) -> Result<Money, ServiceError> {
        let mut state = self.state.write().unwrap();
        state.conversions += 1;

        if state.fail_on_convert {
            return Err(ServiceError::Unavailable("currency service unreachable".to_string()));
        }

        if from.currency_code() == to_code {
            return Ok(from.clone());
        }

        let rate = |code: &str| {
            state
                .rates
                .get(code)
                .copied()
                .ok_or_else(|| ServiceError::InvalidArgument(format!("unsupported currency {code}")))
        };
        let from_rate = rate(from.currency_code())?;
        let to_rate = rate(to_code)?;

        let converted = from
            .total_nanos()
            .checked_mul(to_rate)
            .map(|scaled| scaled / from_rate)
            .ok_or_else(|| ServiceError::InvalidArgument("conversion overflow".to_string()))?;

        Money::from_total_nanos(to_code, converted)
            .map_err(|e| ServiceError::InvalidArgument(e.to_string()))
    }
}
