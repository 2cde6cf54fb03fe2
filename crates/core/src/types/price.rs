//! Type-safe price representation using decimal arithmetic.
//!
//! The remote API sends prices as JSON numbers (occasionally as strings).
//! `Price` accepts both on input and always writes a JSON number, so values
//! persisted locally stay readable by the API and by older clients.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A monetary amount in the tenant's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of minor units (cents).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Create a price from a whole amount.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// This price scaled by a rate, e.g. `0.05` for a 5% tax.
    #[must_use]
    pub fn scaled(&self, rate: Decimal) -> Self {
        Self(self.0 * rate)
    }

    /// Round to two decimal places for display or submission.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
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

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Decimal's own impl accepts numbers and numeric strings alike
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_sum() {
        let lines = [Price::from_units(100).times(3), Price::from_cents(1999).times(2)];
        let total: Price = lines.into_iter().sum();
        assert_eq!(total, Price::from_cents(33998));
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(599).to_string(), "5.99");
        assert_eq!(Price::from_cents(-150).to_string(), "-1.50");
        assert!(Price::from_cents(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
    }

    #[test]
    fn test_scaled_rounding() {
        let tax = Price::from_units(333).scaled(Decimal::new(5, 2)).rounded();
        assert_eq!(tax.to_string(), "16.65");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Price = serde_json::from_str("100").unwrap();
        let b: Price = serde_json::from_str("\"100.00\"").unwrap();
        let c: Price = serde_json::from_str("49.5").unwrap();
        assert_eq!(a, Price::from_units(100));
        assert_eq!(a, b);
        assert_eq!(c, Price::from_cents(4950));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_value(Price::from_cents(4950)).unwrap();
        assert!(json.is_number());
        assert!((json.as_f64().unwrap() - 49.5).abs() < f64::EPSILON);
    }
}
