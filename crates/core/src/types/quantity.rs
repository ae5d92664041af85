//! Bounded quantities.
//!
//! Cart lines are limited to `1..=10` units. Stock counts have no upper bound
//! but must be a non-negative integer when typed into the stock form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised when validating a quantity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Cart quantity outside the allowed range.
    #[error("quantity must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// Smallest allowed value.
        min: u32,
        /// Largest allowed value.
        max: u32,
        /// Rejected value.
        value: i64,
    },
    /// Nothing was entered.
    #[error("Quantity is required")]
    Empty,
    /// Input is negative or not a number.
    #[error("Quantity must be a positive number")]
    Invalid,
}

/// Number of units of a cart line, always within
/// [`CartQuantity::MIN`]..=[`CartQuantity::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct CartQuantity(u32);

impl CartQuantity {
    /// Smallest quantity a cart line may hold.
    pub const MIN: u32 = 1;
    /// Largest quantity a cart line may hold.
    pub const MAX: u32 = 10;

    /// Validate a requested quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::OutOfRange`] when `value` is outside `1..=10`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if Self::contains(value) {
            u32::try_from(value).map(Self).map_err(|_| Self::out_of_range(value))
        } else {
            Err(Self::out_of_range(value))
        }
    }

    /// Whether `value` is an allowed cart quantity.
    #[must_use]
    pub fn contains(value: i64) -> bool {
        (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value)
    }

    /// The raw unit count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// One more unit, or `None` at the upper bound.
    #[must_use]
    pub fn incremented(self) -> Option<Self> {
        Self::new(i64::from(self.0) + 1).ok()
    }

    /// One fewer unit, or `None` at the lower bound.
    #[must_use]
    pub fn decremented(self) -> Option<Self> {
        Self::new(i64::from(self.0) - 1).ok()
    }

    const fn out_of_range(value: i64) -> QuantityError {
        QuantityError::OutOfRange {
            min: Self::MIN,
            max: Self::MAX,
            value,
        }
    }
}

impl Default for CartQuantity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<i64> for CartQuantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CartQuantity> for u32 {
    fn from(quantity: CartQuantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for CartQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Units of a product/size held in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockQuantity(u32);

impl StockQuantity {
    /// Parse user input from the stock form.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Empty`] for blank input and
    /// [`QuantityError::Invalid`] for negative or non-numeric input.
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QuantityError::Empty);
        }
        trimmed
            .parse::<u32>()
            .map(Self)
            .map_err(|_| QuantityError::Invalid)
    }

    /// The raw unit count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StockQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_quantity_bounds() {
        assert!(CartQuantity::new(0).is_err());
        assert!(CartQuantity::new(11).is_err());
        assert!(CartQuantity::new(-3).is_err());
        assert_eq!(CartQuantity::new(1).unwrap().get(), 1);
        assert_eq!(CartQuantity::new(10).unwrap().get(), 10);
    }

    #[test]
    fn test_cart_quantity_step() {
        let max = CartQuantity::new(10).unwrap();
        assert!(max.incremented().is_none());
        assert_eq!(max.decremented().unwrap().get(), 9);

        let min = CartQuantity::default();
        assert!(min.decremented().is_none());
        assert_eq!(min.incremented().unwrap().get(), 2);
    }

    #[test]
    fn test_cart_quantity_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<CartQuantity>("12").is_err());
        assert_eq!(serde_json::from_str::<CartQuantity>("4").unwrap().get(), 4);
    }

    #[test]
    fn test_stock_quantity_parse() {
        assert_eq!(StockQuantity::parse(" 0 ").unwrap().get(), 0);
        assert_eq!(StockQuantity::parse("25").unwrap().get(), 25);
        assert_eq!(StockQuantity::parse(""), Err(QuantityError::Empty));
        assert_eq!(StockQuantity::parse("   "), Err(QuantityError::Empty));
        assert_eq!(StockQuantity::parse("-1"), Err(QuantityError::Invalid));
        assert_eq!(StockQuantity::parse("ten"), Err(QuantityError::Invalid));
    }
}
