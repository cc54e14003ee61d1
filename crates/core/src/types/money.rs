//! Prices and ratings.
//!
//! The store trades in a single currency (euro), so [`Money`] is a plain
//! decimal amount. Arithmetic stays exact; rounding to cents happens only
//! when an amount is displayed. The operators saturate at the decimal range
//! instead of panicking; use the `checked_*` methods to detect overflow.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A non-rounded euro amount.
///
/// Serialized as a JSON number, which is what the store API sends and
/// expects for prices and order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    /// Zero euros.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from whole cents (`1050` is 10.50).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The exact underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded half away from zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// `self + rhs`, or `None` if the sum is out of range.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// `self * quantity`, or `None` if the product is out of range.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// True for amounts below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}€", self.rounded())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Errors that can occur when building a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating must be between 0 and 5, got {0}")]
    OutOfRange(u8),
}

/// A review score from 0 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Highest possible score.
    pub const MAX: u8 = 5;

    /// Build a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::OutOfRange` for values above five.
    pub const fn new(stars: u8) -> Result<Self, RatingError> {
        if stars > Self::MAX {
            return Err(RatingError::OutOfRange(stars));
        }
        Ok(Self(stars))
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Self::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Money::from_cents(2550).to_string(), "25.50€");
        assert_eq!(Money::new(Decimal::new(10005, 3)).to_string(), "10.01€");
        assert_eq!(Money::ZERO.to_string(), "0.00€");
    }

    #[test]
    fn test_sum_and_multiply() {
        let total: Money = [Money::from_cents(1000) * 2, Money::from_cents(550)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(2550));
    }

    #[test]
    fn test_overflow_saturates() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge + Money::from_cents(1), huge);
        assert_eq!(huge * 2, huge);
        assert_eq!([huge, huge].into_iter().sum::<Money>(), huge);
        assert_eq!(
            Money::new(Decimal::MIN) + Money::from_cents(-1),
            Money::new(Decimal::MIN)
        );
    }

    #[test]
    fn test_checked_arithmetic() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_add(Money::from_cents(1)), None);
        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_mul(1), Some(huge));
        assert_eq!(
            Money::from_cents(250).checked_mul(3),
            Some(Money::from_cents(750))
        );
    }

    #[test]
    fn test_wire_format_is_number() {
        let json = serde_json::to_string(&Money::from_cents(1999)).unwrap();
        assert_eq!(json, "19.99");

        let parsed: Money = serde_json::from_str("5.5").unwrap();
        assert_eq!(parsed, Money::from_cents(550));

        let whole: Money = serde_json::from_str("12").unwrap();
        assert_eq!(whole, Money::from_cents(1200));
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(6), Err(RatingError::OutOfRange(6)));
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().stars(), 4);
    }
}
