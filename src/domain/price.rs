//! Price type
//!
//! Domain primitive for seat prices and booking totals.
//! All prices are validated at construction time, ensuring invalid values
//! cannot exist in the system.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places kept (cents)
const SCALE: u32 = 2;

/// Largest seat price, in cents, that `ticket_events.price NUMERIC(12, 2)` holds
const MAX_SEAT_CENTS: i64 = 999_999_999_999;

/// Largest accepted seat price (9999999999.99)
pub fn max_seat_price() -> Decimal {
    Decimal::new(MAX_SEAT_CENTS, SCALE)
}

/// Price represents a validated, non-negative monetary value.
///
/// # Invariants
/// - Value is never negative (free events are allowed)
/// - Always exactly 2 decimal places; finer input is rounded to cents
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use ticket_desk::domain::Price;
///
/// let price = Price::new(Decimal::new(2550, 2)).unwrap();
/// assert_eq!(price.times(2).value(), Decimal::new(5100, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

/// Errors that can occur when creating a Price
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("Price cannot be negative (got {0})")]
    Negative(Decimal),

    #[error("Price exceeds the largest storable value (9999999999.99)")]
    Overflow,

    #[error("Invalid price format: {0}")]
    ParseError(String),
}

impl Price {
    /// Create a new unit price with validation.
    ///
    /// Fractions of a cent are rounded half away from zero.
    ///
    /// # Errors
    /// - `PriceError::Negative` if value < 0
    /// - `PriceError::Overflow` if the rounded value exceeds `max_seat_price()`
    pub fn new(value: Decimal) -> Result<Self, PriceError> {
        if value < Decimal::ZERO {
            return Err(PriceError::Negative(value));
        }

        let mut cents =
            value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        if cents > max_seat_price() {
            return Err(PriceError::Overflow);
        }

        cents.rescale(SCALE);
        Ok(Self(cents))
    }

    /// Zero price (free admission)
    pub fn free() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Total for `seats` seats at this unit price.
    ///
    /// Totals are not bound by the per-seat maximum; `u32::MAX` seats at
    /// `max_seat_price()` still fits a `Decimal`.
    pub fn times(&self, seats: u32) -> Price {
        Price(self.0 * Decimal::from(seats))
    }

    /// Rebuild a stored price or total without re-applying the per-seat ceiling.
    pub(crate) fn from_stored(value: Decimal) -> Result<Self, PriceError> {
        if value < Decimal::ZERO {
            return Err(PriceError::Negative(value));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal =
            Decimal::from_str(s.trim()).map_err(|e| PriceError::ParseError(e.to_string()))?;
        Price::new(decimal)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Price::from_stored(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_positive() {
        let price = Price::new(dec!(49.99)).unwrap();
        assert_eq!(price.value(), dec!(49.99));
    }

    #[test]
    fn test_price_zero_allowed() {
        let price = Price::new(Decimal::ZERO).unwrap();
        assert_eq!(price, Price::free());
    }

    #[test]
    fn test_price_negative_rejected() {
        let price = Price::new(dec!(-1));
        assert!(matches!(price, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_price_rounded_to_cents() {
        assert_eq!(Price::new(dec!(9.999)).unwrap().value().to_string(), "10.00");
        assert_eq!(Price::new(dec!(1.005)).unwrap().value(), dec!(1.01));
        assert_eq!(Price::new(dec!(1.004)).unwrap().value(), dec!(1.00));
    }

    #[test]
    fn test_price_trailing_zeros_ok() {
        assert!(Price::new(dec!(10.500)).is_ok());
    }

    #[test]
    fn test_price_kept_in_cents() {
        assert_eq!(Price::new(dec!(12.5)).unwrap().value().to_string(), "12.50");
        assert_eq!(Price::new(dec!(7)).unwrap().value().to_string(), "7.00");
    }

    #[test]
    fn test_price_large_values_accepted() {
        assert_eq!(Price::new(dec!(2000000)).unwrap().value(), dec!(2000000.00));
        assert_eq!(Price::new(dec!(9999999999.99)).unwrap().value(), max_seat_price());
    }

    #[test]
    fn test_price_beyond_storage_rejected() {
        assert!(matches!(Price::new(dec!(10000000000)), Err(PriceError::Overflow)));
        // Rounds up past the column limit
        assert!(matches!(Price::new(dec!(9999999999.995)), Err(PriceError::Overflow)));
    }

    #[test]
    fn test_largest_total_fits() {
        let total = Price::new(max_seat_price()).unwrap().times(u32::MAX);
        assert!(total.value() > max_seat_price());
    }

    #[test]
    fn test_price_times_seats() {
        let price = Price::new(dec!(12.50)).unwrap();
        assert_eq!(price.times(3).value(), dec!(37.50));
        assert_eq!(price.times(0).value(), Decimal::ZERO);
    }

    #[test]
    fn test_price_from_str() {
        let price: Price = " 20.25 ".parse().unwrap();
        assert_eq!(price.value(), dec!(20.25));
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::ParseError(_))));
    }
}
