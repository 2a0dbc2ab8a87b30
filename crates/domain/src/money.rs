//! Fixed-point currency amounts.

use serde::{Deserialize, Serialize};

use crate::error::MoneyError;

/// Number of nanos in one whole currency unit.
pub const NANOS_PER_UNIT: i32 = 1_000_000_000;

const NANOS_PER_UNIT_WIDE: i128 = NANOS_PER_UNIT as i128;

/// An amount of money in a single currency.
///
/// Stored as a whole `units` part plus a fractional `nanos` part
/// (10^-9 units). `nanos` carries the same sign as `units` unless one of
/// them is zero, and its magnitude is always below 10^9.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    currency_code: String,
    units: i64,
    nanos: i32,
}

impl Money {
    /// Creates a money amount, validating the currency code and the
    /// sign/magnitude invariant.
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Result<Self, MoneyError> {
        let currency_code = currency_code.into();
        validate_currency_code(&currency_code)?;
        if !is_valid_parts(units, nanos) {
            return Err(MoneyError::InvalidValue { units, nanos });
        }
        Ok(Self {
            currency_code,
            units,
            nanos,
        })
    }

    /// Returns a zero amount in the given currency.
    pub fn zero(currency_code: impl Into<String>) -> Result<Self, MoneyError> {
        Self::new(currency_code, 0, 0)
    }

    /// Builds an amount from a total count of nanos.
    pub fn from_total_nanos(
        currency_code: impl Into<String>,
        total_nanos: i128,
    ) -> Result<Self, MoneyError> {
        let units = i64::try_from(total_nanos / NANOS_PER_UNIT_WIDE)
            .map_err(|_| MoneyError::Overflow)?;
        // Truncating remainder keeps the sign of the dividend.
        let nanos = (total_nanos % NANOS_PER_UNIT_WIDE) as i32;
        Self::new(currency_code, units, nanos)
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// Returns the amount as a single count of nanos.
    pub fn total_nanos(&self) -> i128 {
        i128::from(self.units) * NANOS_PER_UNIT_WIDE + i128::from(self.nanos)
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0 && self.nanos == 0
    }

    pub fn is_negative(&self) -> bool {
        self.units < 0 || self.nanos < 0
    }

    /// Returns true if both amounts are in the same currency.
    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency_code == other.currency_code
    }

    /// Adds two amounts of the same currency.
    ///
    /// Nanos overflowing a whole unit carry into `units`; if the parts end
    /// with opposite signs one unit is borrowed to realign them.
    pub fn sum(&self, other: &Money) -> Result<Money, MoneyError> {
        if !self.same_currency(other) {
            return Err(MoneyError::CurrencyMismatch {
                expected: self.currency_code.clone(),
                actual: other.currency_code.clone(),
            });
        }

        let mut units = self
            .units
            .checked_add(other.units)
            .ok_or(MoneyError::Overflow)?;
        // Both operands are below 10^9 in magnitude, so this fits in i32.
        let mut nanos = self.nanos + other.nanos;

        if nanos >= NANOS_PER_UNIT {
            units = units.checked_add(1).ok_or(MoneyError::Overflow)?;
            nanos -= NANOS_PER_UNIT;
        } else if nanos <= -NANOS_PER_UNIT {
            units = units.checked_sub(1).ok_or(MoneyError::Overflow)?;
            nanos += NANOS_PER_UNIT;
        }

        if units > 0 && nanos < 0 {
            units -= 1;
            nanos += NANOS_PER_UNIT;
        } else if units < 0 && nanos > 0 {
            units += 1;
            nanos -= NANOS_PER_UNIT;
        }

        Ok(Money {
            currency_code: self.currency_code.clone(),
            units,
            nanos,
        })
    }

    /// Multiplies the amount by a non-negative integer without losing
    /// precision. The product is computed over 128-bit nanos.
    pub fn multiply(&self, multiplier: u32) -> Result<Money, MoneyError> {
        let total = self.total_nanos() * i128::from(multiplier);
        Self::from_total_nanos(self.currency_code.clone(), total)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let mut fraction = format!("{:09}", self.nanos.unsigned_abs());
        while fraction.len() > 2 && fraction.ends_with('0') {
            fraction.pop();
        }
        write!(
            f,
            "{sign}{}.{fraction} {}",
            self.units.unsigned_abs(),
            self.currency_code
        )
    }
}

fn validate_currency_code(code: &str) -> Result<(), MoneyError> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(MoneyError::InvalidCurrencyCode(code.to_string()))
    }
}

fn is_valid_parts(units: i64, nanos: i32) -> bool {
    if nanos <= -NANOS_PER_UNIT || nanos >= NANOS_PER_UNIT {
        return false;
    }
    !((units > 0 && nanos < 0) || (units < 0 && nanos > 0))
}
