//! # Validation Module
//!
//! Input validation utilities for the vending service.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service command (Rust)                                        │
//! │  ├── Type validation (deserialization, Coin parsing)                    │
//! │  └── THIS MODULE: Business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── CHECK constraints (deposit >= 0, cost % 5 = 0)                     │
//! │  ├── UNIQUE constraints (username, seller + product name)               │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vending_core::validation::{validate_cost, validate_quantity};
//!
//! assert!(validate_cost(55).is_ok());
//! assert!(validate_cost(12).is_err());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::ProductDetails;
use crate::{COST_STEP, MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a username.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 50 characters
pub fn validate_username(username: &str) -> ValidationResult<()> {
    validate_name("username", username)
}

/// Validates a plaintext password before it is hashed.
///
/// ## Rules
/// - Between 5 and 20 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Example
/// ```rust
/// use vending_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Cola").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("productName", name)
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product cost.
///
/// ## Rules
/// - Must be positive
/// - Must be a multiple of 5 (the smallest coin)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /product { "cost": 55 }                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_cost(55) ← THIS FUNCTION                                      │
/// │       │                                                                 │
/// │       ├── cost <= 0?     → InvalidCost                                  │
/// │       │                                                                 │
/// │       ├── cost % 5 != 0? → InvalidCost                                  │
/// │       │                                                                 │
/// │       └── OK → Catalog create/update                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_cost(cost: i64) -> ValidationResult<()> {
    if cost <= 0 || cost % COST_STEP != 0 {
        return Err(ValidationError::InvalidCost { cost });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock(amount_available: i64) -> ValidationResult<()> {
    if amount_available < 0 {
        return Err(ValidationError::Negative {
            field: "amountAvailable".to_string(),
        });
    }

    Ok(())
}

/// Validates a purchase quantity.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates the deposit a user registers with.
///
/// ## Rules
/// - Must be non-negative
/// - Must be a multiple of 5, i.e. payable in coins
pub fn validate_opening_deposit(deposit: i64) -> ValidationResult<()> {
    if deposit < 0 {
        return Err(ValidationError::Negative {
            field: "deposit".to_string(),
        });
    }

    if deposit % COST_STEP != 0 {
        return Err(ValidationError::NotCoinAligned {
            field: "deposit".to_string(),
            value: deposit,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every seller-supplied product field.
pub fn validate_product_details(details: &ProductDetails) -> ValidationResult<()> {
    validate_product_name(&details.product_name)?;
    validate_cost(details.cost)?;
    validate_stock(details.amount_available)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
