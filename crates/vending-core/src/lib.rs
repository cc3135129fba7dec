//! # vending-core: Pure Business Logic for the Vending Service
//!
//! This crate is the **heart** of the vending service. It contains the
//! purchase rules, deposit accounting and access decisions as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Vending Service Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               vending-service (commands, locks)                 │   │
//! │  │    register_user, deposit, reset_deposit, buy, ...              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vending-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │   coin   │ │  ledger  │ │ purchase │ │  access  │          │   │
//! │  │   │ 5..100   │ │ deposit  │ │  quote   │ │  roles   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 vending-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Role, PurchaseReceipt)
//! - [`coin`] - Accepted coin denominations
//! - [`credit`] - Integer credit arithmetic
//! - [`ledger`] - Deposit mutations
//! - [`purchase`] - Purchase quotes (funds, stock, change)
//! - [`access`] - Authorization decisions
//! - [`password`] - argon2 password hashing
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use vending_core::{purchase, Product, Role, User};
//!
//! let buyer = User {
//!     id: 1,
//!     username: "bob".to_string(),
//!     password_hash: String::new(),
//!     deposit: 150,
//!     role: Role::Buyer,
//! };
//! let cola = Product {
//!     id: 1,
//!     product_name: "Cola".to_string(),
//!     amount_available: 5,
//!     cost: 50,
//!     seller_id: 2,
//! };
//!
//! let quote = purchase::quote(&buyer, &cola, 2).unwrap();
//! assert_eq!(quote.change.units(), 50);
//! assert_eq!(quote.new_stock, 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod coin;
pub mod credit;
pub mod error;
pub mod ledger;
pub mod password;
pub mod purchase;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::Authorization;
pub use coin::Coin;
pub use credit::Credit;
pub use error::{CoreError, CoreResult, ValidationError};
pub use purchase::PurchaseQuote;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Costs and deposits are whole multiples of the smallest coin.
pub const COST_STEP: i64 = 5;

/// Longest accepted username or product name.
pub const MAX_NAME_LENGTH: usize = 50;

/// Plaintext password bounds, checked before hashing.
pub const MIN_PASSWORD_LENGTH: usize = 5;
pub const MAX_PASSWORD_LENGTH: usize = 20;
