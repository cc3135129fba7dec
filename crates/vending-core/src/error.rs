//! # Error Types
//!
//! Domain-specific error types for vending-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vending-core errors (this file)                                        │
//! │  ├── CoreError        - Access, ledger, catalog and purchase failures  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vending-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vending-service errors                                                 │
//! │  └── ApiError         - What callers see (code + message + status)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Messages are fixed and human-readable; the caller shows them as-is
//! 3. Errors carry the numbers the caller needs (max affordable, available)

use thiserror::Error;

use crate::coin::COIN_DENOMINATIONS;
use crate::types::Role;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant maps to a stable status category in the service layer:
/// `Authentication` is the only 401, everything else is a 400-class
/// business-rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Unknown username or wrong password.
    #[error("Wrong credentials. Please try again")]
    Authentication,

    /// Authenticated, but the role does not allow the operation.
    ///
    /// ## When This Occurs
    /// - A seller tries to deposit coins or buy a product
    /// - A buyer tries to list a product
    /// - Anyone but an admin tries to remove a user
    #[error("You should be a {required} to access this endpoint")]
    WrongRole { required: Role, actual: Role },

    /// Right role, but acting on another principal's resource.
    #[error("{0}")]
    Forbidden(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The seller already lists a product with this name.
    #[error("Product '{name}' is already registered for this seller")]
    DuplicateProduct { name: String },

    /// Username taken at registration.
    #[error("Username already registered")]
    DuplicateUser { username: String },

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// User cannot be found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Purchase attempted with an empty deposit.
    #[error("Your balance is 0. Please refill your account")]
    ZeroBalance,

    /// Deposit does not cover the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// deposit=60, cost=55, quantity=2
    ///      │
    ///      ▼
    /// 60 < 110 → max_affordable = 60 / 55 = 1
    ///      │
    ///      ▼
    /// "You can buy: 1 pcs!"
    /// ```
    #[error("{}", insufficient_funds_message(.max_affordable))]
    InsufficientFunds { max_affordable: i64 },

    /// Stock does not cover the requested quantity.
    #[error("{}", out_of_stock_message(.available))]
    OutOfStock { available: i64 },

    /// A debit larger than the balance reached the ledger.
    ///
    /// The purchase engine checks funds before debiting, so this only
    /// fires when that precondition is broken by a caller.
    #[error("Cannot debit {requested} from a balance of {balance}")]
    InsufficientBalance { balance: i64, requested: i64 },

    /// Password hashing backend failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

fn insufficient_funds_message(max_affordable: &i64) -> String {
    if *max_affordable > 0 {
        format!("You can buy: {} pcs!", max_affordable)
    } else {
        "You can buy no pcs. Try deposit or choose another product!".to_string()
    }
}

fn out_of_stock_message(available: &i64) -> String {
    if *available > 0 {
        format!("Only {} pcs available", available)
    } else {
        "No product amount available. Please try another product".to_string()
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Deposit value is not an accepted coin.
    #[error("You should deposit a value from this list: {:?}", COIN_DENOMINATIONS)]
    InvalidCoin { value: i64 },

    /// Product cost is not a positive multiple of 5.
    #[error("Cost must be a positive multiple of 5, got {cost}")]
    InvalidCost { cost: i64 },

    /// Amount cannot be paid in whole coins.
    #[error("{field} must be a multiple of 5, got {value}")]
    NotCoinAligned { field: String, value: i64 },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Arithmetic on the value would overflow.
    #[error("{field} is too large")]
    Overflow { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_messages() {
        let err = CoreError::InsufficientFunds { max_affordable: 1 };
        assert_eq!(err.to_string(), "You can buy: 1 pcs!");

        let err = CoreError::InsufficientFunds { max_affordable: 0 };
        assert_eq!(
            err.to_string(),
            "You can buy no pcs. Try deposit or choose another product!"
        );
    }

    #[test]
    fn test_out_of_stock_messages() {
        let err = CoreError::OutOfStock { available: 1 };
        assert_eq!(err.to_string(), "Only 1 pcs available");

        let err = CoreError::OutOfStock { available: 0 };
        assert_eq!(
            err.to_string(),
            "No product amount available. Please try another product"
        );
    }

    #[test]
    fn test_role_message() {
        let err = CoreError::WrongRole {
            required: Role::Buyer,
            actual: Role::Seller,
        };
        assert_eq!(err.to_string(), "You should be a buyer to access this endpoint");
    }

    #[test]
    fn test_invalid_coin_lists_denominations() {
        let err = ValidationError::InvalidCoin { value: 3 };
        assert_eq!(
            err.to_string(),
            "You should deposit a value from this list: [5, 10, 20, 50, 100]"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::InvalidCost { cost: 12 };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
