//! # Domain Types
//!
//! Core domain types used throughout the vending service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Product      │   │ PurchaseReceipt │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  total_spent    │       │
//! │  │  username (uniq)│◄──│  seller_id      │   │  product_name   │       │
//! │  │  password_hash  │   │  product_name   │   │  change         │       │
//! │  │  deposit        │   │  cost (×5)      │   └─────────────────┘       │
//! │  │  role           │   │  amount_avail.  │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │      Role       │   │ PurchaseRecord  │                              │
//! │  │  Buyer          │   │  (history row,  │                              │
//! │  │  Seller         │   │   snapshots)    │                              │
//! │  │  Admin          │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Users and products are keyed by integer ids assigned by storage.
//! Users are also unique by `username`; products by `(seller_id, product_name)`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credit::Credit;

// =============================================================================
// Role
// =============================================================================

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Deposits coins and buys products.
    Buyer,
    /// Lists and manages their own products.
    Seller,
    /// Removes users.
    Admin,
}

impl Role {
    /// Lowercase name, as stored and serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user.
///
/// `deposit` only changes through the ledger: coin deposits, resets and
/// completed purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// argon2 PHC string. Never serialized to callers.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Balance in base coin units.
    pub deposit: i64,
    pub role: Role,
}

impl User {
    /// Returns the deposit as Credit.
    #[inline]
    pub fn balance(&self) -> Credit {
        Credit::from_units(self.deposit)
    }

    #[inline]
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

/// Input for registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub deposit: i64,
    pub role: Role,
}

// =============================================================================
// Product
// =============================================================================

/// A product listed by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    pub amount_available: i64,
    /// Unit cost in base coin units, always a positive multiple of 5.
    pub cost: i64,
    pub seller_id: i64,
}

impl Product {
    /// Returns the unit cost as Credit.
    #[inline]
    pub fn price(&self) -> Credit {
        Credit::from_units(self.cost)
    }

    /// Checks if the current stock covers `quantity`.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.amount_available >= quantity
    }

    #[inline]
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.seller_id == user.id
    }
}

/// Seller-supplied product fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub product_name: String,
    pub cost: i64,
    pub amount_available: i64,
}

// =============================================================================
// Credentials
// =============================================================================

/// Basic-auth style credentials supplied with each call.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Purchases
// =============================================================================

/// What the buyer gets back from a successful purchase.
///
/// `total_spent` is the number of items bought, `change` the deposit left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub total_spent: i64,
    pub product_name: String,
    pub change: i64,
}

/// A completed purchase, kept for the buyer's history.
/// Product name and unit cost are frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub buyer_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost: i64,
    pub total_cost: i64,
    pub change: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
