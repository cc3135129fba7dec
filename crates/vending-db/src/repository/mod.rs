//! # Repository Module
//!
//! Database repository implementations for the vending service.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Connections                         │
//! │                                                                         │
//! │  Service command                                                        │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                                │
//! │       │  ProductRepository::find_by_id(&mut tx, id)                     │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────┐         │
//! │  │ UserRepository   │ │ ProductRepository│ │PurchaseRepository│         │
//! │  │ find_by_username │ │ find_by_id       │ │ apply            │         │
//! │  │ insert           │ │ insert / update  │ │ record           │         │
//! │  │ set_deposit      │ │ update_stock     │ │ list_by_buyer    │         │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────┘         │
//! │       │                                                                 │
//! │       │  SQL on the connection the caller handed in                     │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Repositories hold no state. The caller owns the connection or          │
//! │  transaction, and therefore decides what commits together.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts, credentials, deposits
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and stock
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Purchase write-back and history

pub mod product;
pub mod purchase;
pub mod user;
