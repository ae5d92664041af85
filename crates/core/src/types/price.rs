//! Type-safe price representation using decimal arithmetic.
//!
//! The backend stores prices as `BigDecimal` and sends them as JSON numbers,
//! so a [`Price`] serializes to a bare number rather than a string.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-currency-tagged store price (the store sells in a single currency).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// `percentage` percent of this price, unrounded.
    #[must_use]
    pub fn percent(self, percentage: u32) -> Self {
        Self(self.0 * Decimal::from(percentage) / Decimal::ONE_HUNDRED)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0.round_dp(2))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_times_and_sum() {
        let jersey = Price::from_cents(24_999);
        let total: Price = [jersey.times(2), Price::from_cents(1_000)].into_iter().sum();
        assert_eq!(total, Price::from_cents(50_998));
    }

    #[test]
    fn test_percent_off() {
        let subtotal = Price::from_cents(89_997);
        let discount = subtotal.percent(10);
        assert_eq!(discount.to_string(), "$90.00");
        assert_eq!(subtotal - discount, Price::from(Decimal::new(809_973, 3)));
        assert_eq!(subtotal.percent(0), Price::ZERO);
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(24_999).to_string(), "$249.99");
        assert_eq!(Price::from_cents(500).to_string(), "$5.00");
    }

    #[test]
    fn test_price_deserializes_numbers() {
        let price: Price = serde_json::from_str("249.99").unwrap();
        assert_eq!(price, Price::from_cents(24_999));
        let whole: Price = serde_json::from_str("250").unwrap();
        assert_eq!(whole, Price::from_cents(25_000));
    }
}
