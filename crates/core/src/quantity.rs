//! Non-negative decimal stock quantities.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A stock quantity.
///
/// Invariant: never negative, enforced at construction and through serde.
/// Arithmetic that could cross zero is checked and returns `None`, so the
/// caller decides whether that means `InsufficientStock`, `OverReturn`, or
/// something else.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl TryFrom<Decimal> for Quantity {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl Quantity {
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    /// Wrap a decimal, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LedgerError::validation(
                "quantity",
                "must not be negative",
            ));
        }
        Ok(Self(value))
    }

    /// A strictly positive quantity (operation lines require > 0).
    pub fn positive(value: Decimal) -> Result<Self, LedgerError> {
        if value <= Decimal::ZERO {
            return Err(LedgerError::validation("quantity", "must be positive"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Quantity) -> Quantity {
        // Sum of two non-negative decimals stays non-negative.
        Quantity(self.0 + other.0)
    }

    /// `None` when the subtraction would go below zero.
    pub fn checked_sub(self, other: Quantity) -> Option<Quantity> {
        if other.0 > self.0 {
            return None;
        }
        Some(Quantity(self.0 - other.0))
    }

    /// Apply a signed delta, `None` when the result would be negative.
    pub fn checked_apply(self, delta: Decimal) -> Option<Quantity> {
        let next = self.0 + delta;
        if next.is_sign_negative() && !next.is_zero() {
            return None;
        }
        Some(Quantity(next))
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.0
    }
}
