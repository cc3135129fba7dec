//! # Coin Validator
//!
//! The machine only accepts a fixed set of coins. Every deposit passes
//! through [`validate_coin`] before it reaches the ledger.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PUT /deposit { "coinValue": 20 }                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_coin(20) ← THIS MODULE                                        │
//! │       │                                                                 │
//! │       ├── 5, 10, 20, 50, 100 → Ok(Coin)                                 │
//! │       │                                                                 │
//! │       └── anything else      → ValidationError::InvalidCoin             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledger::add_deposit(&mut user, coin)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Accepted coin values in base units.
pub const COIN_DENOMINATIONS: [i64; 5] = [5, 10, 20, 50, 100];

/// A coin accepted by the machine.
///
/// Serialized as its numeric value so `{"coinValue": 50}` round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Coin {
    Five,
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl Coin {
    /// All coins in ascending order.
    pub const ALL: [Coin; 5] = [Coin::Five, Coin::Ten, Coin::Twenty, Coin::Fifty, Coin::Hundred];

    /// Value of the coin in base units.
    #[inline]
    pub const fn value(self) -> i64 {
        match self {
            Coin::Five => 5,
            Coin::Ten => 10,
            Coin::Twenty => 20,
            Coin::Fifty => 50,
            Coin::Hundred => 100,
        }
    }
}

impl TryFrom<i64> for Coin {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Coin::ALL
            .into_iter()
            .find(|coin| coin.value() == value)
            .ok_or(ValidationError::InvalidCoin { value })
    }
}

impl From<Coin> for i64 {
    fn from(coin: Coin) -> Self {
        coin.value()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Validates a raw deposit value against the coin set.
///
/// ## Example
/// ```rust
/// use vending_core::coin::{validate_coin, Coin};
///
/// assert_eq!(validate_coin(50).unwrap(), Coin::Fifty);
/// assert!(validate_coin(3).is_err());
/// ```
pub fn validate_coin(value: i64) -> ValidationResult<Coin> {
    Coin::try_from(value)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_every_denomination() {
        for value in COIN_DENOMINATIONS {
            let coin = validate_coin(value).unwrap();
            assert_eq!(coin.value(), value);
        }
    }

    #[test]
    fn test_rejects_everything_else() {
        for value in [-5, 0, 1, 4, 15, 25, 55, 99, 200, 1000] {
            assert_eq!(
                validate_coin(value),
                Err(ValidationError::InvalidCoin { value })
            );
        }
    }

    #[test]
    fn test_deserializes_from_number() {
        let coin: Coin = serde_json::from_str("20").unwrap();
        assert_eq!(coin, Coin::Twenty);

        assert!(serde_json::from_str::<Coin>("30").is_err());
        assert_eq!(serde_json::to_string(&Coin::Hundred).unwrap(), "100");
    }
}
