//! # vending-service: Commands of the Vending Service
//!
//! Authenticates callers, serializes work on shared entities and drives the
//! pure rules of `vending-core` against the storage of `vending-db`.
//!
//! ## Module Organization
//! ```text
//! vending_service/
//! ├── lib.rs          ◄─── You are here
//! ├── service.rs      ◄─── VendingService (database + locks)
//! ├── access.rs       ◄─── Credential lookup + authorization decision
//! ├── locks.rs        ◄─── Per-user / per-product async mutexes
//! ├── commands/
//! │   ├── user.rs     ◄─── Register, read, update, remove, deposit, reset
//! │   ├── product.rs  ◄─── Create, find, update, delete
//! │   └── purchase.rs ◄─── Buy, purchase history
//! ├── config.rs       ◄─── Environment configuration
//! ├── telemetry.rs    ◄─── tracing subscriber setup
//! └── error.rs        ◄─── ApiError (code, message, status)
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use vending_service::{commands::purchase, ServiceConfig, VendingService};
//!
//! let svc = VendingService::open(&ServiceConfig::load()?).await?;
//! let receipt = purchase::buy(&svc, &creds, BuyRequest { product_id: 7, amount: 2 }).await?;
//! ```

pub mod access;
pub mod commands;
pub mod config;
pub mod error;
pub mod locks;
pub mod service;
pub mod telemetry;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use locks::{EntityLocks, LockKey};
pub use service::VendingService;
