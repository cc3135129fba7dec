//! # Credit Module
//!
//! Provides the `Credit` type for deposit balances and product costs.
//!
//! ## Why Integer Credit?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ONE UNIT, NO FRACTIONS                                                 │
//! │                                                                         │
//! │  Coins:    5, 10, 20, 50, 100  (base units)                             │
//! │  Costs:    multiples of 5       (base units)                            │
//! │  Deposits: sums of coins        (base units)                            │
//! │                                                                         │
//! │  Every amount is an i64 count of base units. "How many can I buy?"     │
//! │  is a floor division: 60 / 55 = 1. Nothing is ever rounded.            │
//! │                                                                         │
//! │  Arithmetic is checked: an overflow is an error, never a wrap.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vending_core::credit::Credit;
//!
//! let deposit = Credit::from_units(150);
//! let cost = Credit::from_units(50);
//!
//! let total = cost.checked_times(2).unwrap();
//! assert_eq!(total.units(), 100);
//! assert_eq!(deposit.checked_sub(total).unwrap().units(), 50);
//! assert_eq!(deposit.affordable_count(cost), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coin::Coin;

// =============================================================================
// Credit Type
// =============================================================================

/// An amount of credit in base coin units.
///
/// ## Design Decisions
/// - **i64**: matches the storage column type; negative values never
///   survive validation but are representable so subtraction can be checked
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credit(i64);

impl Credit {
    /// Creates a credit value from base units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Credit(units)
    }

    /// Returns the value in base units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero credit.
    #[inline]
    pub const fn zero() -> Self {
        Credit(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Credit) -> Option<Credit> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Credit(units)),
            None => None,
        }
    }

    /// Subtracts, returning `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Credit) -> Option<Credit> {
        match self.0.checked_sub(other.0) {
            Some(units) => Some(Credit(units)),
            None => None,
        }
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vending_core::credit::Credit;
    ///
    /// let unit_cost = Credit::from_units(55);
    /// assert_eq!(unit_cost.checked_times(2).unwrap().units(), 110);
    /// assert!(Credit::from_units(i64::MAX).checked_times(2).is_none());
    /// ```
    #[inline]
    pub const fn checked_times(self, quantity: i64) -> Option<Credit> {
        match self.0.checked_mul(quantity) {
            Some(units) => Some(Credit(units)),
            None => None,
        }
    }

    /// How many whole items of `price` this credit pays for (floor division).
    ///
    /// A non-positive price buys nothing.
    ///
    /// ## Example
    /// ```rust
    /// use vending_core::credit::Credit;
    ///
    /// assert_eq!(Credit::from_units(60).affordable_count(Credit::from_units(55)), 1);
    /// assert_eq!(Credit::from_units(50).affordable_count(Credit::from_units(55)), 0);
    /// ```
    #[inline]
    pub const fn affordable_count(self, price: Credit) -> i64 {
        if price.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        self.0 / price.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl From<Coin> for Credit {
    fn from(coin: Coin) -> Self {
        Credit(coin.value())
    }
}

impl fmt::Display for Credit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
