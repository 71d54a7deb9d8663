//! Fixed-point money type.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored as signed 64-bit minor units with four decimal places
//! and converted to `rust_decimal::Decimal` only at the boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced when converting a decimal value into [`Money`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The value carries more decimal places than the fixed-point scale.
    #[error("Amount {0} has more than four decimal places")]
    TooPrecise(Decimal),
    /// The value does not fit the 64-bit minor-unit range.
    #[error("Amount {0} is out of range")]
    OutOfRange(Decimal),
}

/// A monetary amount with four decimal places.
///
/// Internally an integer count of minor units (10 000 per whole unit), so
/// addition, subtraction, and comparison are exact. Conversion from
/// [`Decimal`] rejects finer precision instead of rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Number of decimal places carried by every amount.
    pub const SCALE: u32 = 4;
    /// Minor units per whole unit.
    pub const MINOR_PER_UNIT: i64 = 10_000;
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw count of minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw count of minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Converts a decimal value, rejecting precision beyond [`Self::SCALE`].
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::TooPrecise`] if the value has a nonzero digit
    /// past the fourth decimal place, or [`MoneyError::OutOfRange`] if the
    /// minor-unit count does not fit an `i64`.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let normalized = value.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(MoneyError::TooPrecise(value));
        }
        normalized
            .checked_mul(Decimal::from(Self::MINOR_PER_UNIT))
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or(MoneyError::OutOfRange(value))
    }

    /// Returns the amount as a decimal value at full scale.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, Self::SCALE)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Subtracts an amount, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal().normalize())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(value).map_err(serde::de::Error::custom)
    }
}
