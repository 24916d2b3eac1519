//! Exact money type
//!
//! Balances and amounts are stored as signed integer minor units (diram,
//! 1/100 somoni) so that SQL delta updates stay exact. The JSON boundary
//! speaks decimal somoni via `rust_decimal`.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Money in minor units (cents). Wraps `i64` so it binds as a plain
/// INTEGER column while keeping arithmetic type-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(transparent))]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("amount has more than 2 decimal places: {0}")]
    TooPrecise(Decimal),

    #[error("amount out of range: {0}")]
    OutOfRange(Decimal),

    #[error("amount must be positive: {0}")]
    NotPositive(Decimal),
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Convert a decimal amount, rejecting sub-cent precision.
    pub fn try_from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let scaled = value
            .checked_mul(Decimal::from(100))
            .ok_or(MoneyError::OutOfRange(value))?;
        if scaled.fract() != Decimal::ZERO {
            return Err(MoneyError::TooPrecise(value));
        }
        scaled
            .to_i64()
            .map(Money)
            .ok_or(MoneyError::OutOfRange(value))
    }

    /// Convert a decimal amount that must be strictly positive
    /// (transaction amounts, invoice amounts).
    pub fn try_positive(value: Decimal) -> Result<Self, MoneyError> {
        let money = Self::try_from_decimal(value)?;
        if money.0 <= 0 {
            return Err(MoneyError::NotPositive(value));
        }
        Ok(money)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

// JSON carries decimal somoni (e.g. 200 or 49.5), matching what the
// web/bot clients send and render.
impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        rust_decimal::serde::float::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        Money::try_from_decimal(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn decimal_round_trip_keeps_cents_exact() {
        let m = Money::try_from_decimal(Decimal::from_str("149.95").unwrap()).unwrap();
        assert_eq!(m.cents(), 14995);
        assert_eq!(m.to_decimal(), Decimal::from_str("149.95").unwrap());
    }

    #[test]
    fn sub_cent_precision_is_rejected() {
        let err = Money::try_from_decimal(Decimal::from_str("0.001").unwrap()).unwrap_err();
        assert!(matches!(err, MoneyError::TooPrecise(_)));
    }

    #[test]
    fn positive_amounts_reject_zero_and_negative() {
        assert!(matches!(
            Money::try_positive(Decimal::ZERO),
            Err(MoneyError::NotPositive(_))
        ));
        assert!(matches!(
            Money::try_positive(Decimal::from(-5)),
            Err(MoneyError::NotPositive(_))
        ));
        assert_eq!(
            Money::try_positive(Decimal::from(5)).unwrap(),
            Money::from_cents(500)
        );
    }

    #[test]
    fn negative_balances_are_representable() {
        // Overpayment is a real business state, not an error.
        let balance = Money::from_cents(5000) - Money::from_cents(7500);
        assert_eq!(balance.cents(), -2500);
        assert!(!balance.is_positive());
    }

    #[test]
    fn json_shape_is_a_plain_number() {
        let m = Money::from_cents(20000);
        assert_eq!(serde_json::to_string(&m).unwrap(), "200.0");
        let parsed: Money = serde_json::from_str("49.5").unwrap();
        assert_eq!(parsed.cents(), 4950);
    }
}
