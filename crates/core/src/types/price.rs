//! Type-safe price representation using decimal arithmetic.
//!
//! Prices keep full decimal precision when stored and summed. Rounding to two
//! decimal places happens only when formatting for display.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input string is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative unit price.
///
/// Serializes as a JSON number, which is what the cart backend stores.
/// Deserializes from either a number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price, at full precision.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

impl core::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s
            .trim()
            .trim_start_matches('$')
            .parse::<Decimal>()
            .map_err(|e| PriceError::Invalid(format!("{s}: {e}")))?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format a decimal amount as a dollar string rounded to two places.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let err = Price::new(Decimal::new(-1, 2)).unwrap_err();
        assert!(matches!(err, PriceError::Negative(_)));
    }

    #[test]
    fn test_zero_price_allowed() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_times_keeps_precision() {
        let price = Price::new(Decimal::new(3333, 3)).unwrap(); // 3.333
        assert_eq!(price.times(3), Decimal::new(9999, 3));
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::new(Decimal::new(1050, 2)).unwrap().display(), "$10.50");
        assert_eq!(format_amount(Decimal::new(2005, 3)), "$2.01");
        assert_eq!(format_amount(Decimal::new(255_049, 4)), "$25.50");
        assert_eq!(format_amount(Decimal::from(7)), "$7.00");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("$5.50".parse::<Price>().unwrap().amount(), Decimal::new(550, 2));
        assert!("abc".parse::<Price>().is_err());
        assert!("-2".parse::<Price>().is_err());
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let price: Price = serde_json::from_str("10.5").unwrap();
        assert_eq!(price.amount(), Decimal::new(105, 1));
        let price: Price = serde_json::from_str("\"5.50\"").unwrap();
        assert_eq!(price.amount(), Decimal::new(550, 2));
        assert!(serde_json::from_str::<Price>("-3").is_err());
        assert_eq!(serde_json::to_string(&price).unwrap(), "5.5");
    }

    #[test]
    fn test_deserialize_as_struct_field() {
        let product: crate::Product = serde_json::from_str(
            r#"{"_id":"p1","name":"Lamp","price":24.99,"image":"","category":"home"}"#,
        )
        .unwrap();
        assert_eq!(product.price.amount(), Decimal::new(2499, 2));
    }
}
