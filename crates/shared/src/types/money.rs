//! Exact integer money amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Balances and top-up nominals are whole counts of the currency's minor unit
//! (e.g. rupiah, cents) held in an `i64`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An amount of money in minor units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MinorUnits(i64);

/// Error returned when text is not an integer literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not an integer amount")]
pub struct MoneyParseError {
    /// The rejected input.
    pub input: String,
}

impl MinorUnits {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw minor-unit count.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw minor-unit count.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Subtracts `other`, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl std::fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MinorUnits {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self).map_err(|_| MoneyParseError {
            input: s.to_string(),
        })
    }
}

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
