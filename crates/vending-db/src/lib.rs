//! # vending-db: Database Layer for the Vending Service
//!
//! This crate provides storage for the vending service.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vending Service Data Flow                          │
//! │                                                                         │
//! │  Service command (buy)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   vending-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ UserRepo      │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_initial_ │   │   │
//! │  │   │ Transactions  │    │ PurchaseRepo  │    │  schema.sql  │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (vending.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (user, product, purchase)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vending_db::{Database, DbConfig, ProductRepository};
//!
//! let db = Database::new(DbConfig::new("vending.db")).await?;
//!
//! let mut conn = db.acquire().await?;
//! let colas = ProductRepository::list_by_name(&mut conn, "Cola").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Connection type every repository function takes
pub use sqlx::SqliteConnection;

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::user::UserRepository;
