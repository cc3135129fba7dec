//! # Service Handle
//!
//! Shared state every command runs against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  VendingService  (Clone: all clones share the same pool and locks)      │
//! │                                                                         │
//! │   ┌──────────────────┐        ┌──────────────────────────────────┐     │
//! │   │ Database         │        │ EntityLocks                      │     │
//! │   │ SqlitePool       │        │ User("bob")  → Mutex             │     │
//! │   │ begin / acquire  │        │ Product(7)   → Mutex             │     │
//! │   └──────────────────┘        └──────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;
use vending_db::{Database, DbConfig, DbResult};

use crate::config::ServiceConfig;
use crate::locks::EntityLocks;

/// Database plus entity locks.
#[derive(Debug, Clone)]
pub struct VendingService {
    db: Database,
    locks: EntityLocks,
}

impl VendingService {
    /// Wraps an open database.
    pub fn new(db: Database) -> Self {
        VendingService {
            db,
            locks: EntityLocks::new(),
        }
    }

    /// Opens the configured database (running migrations) and wraps it.
    pub async fn open(config: &ServiceConfig) -> DbResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.database_path.display(), "Vending service ready");
        Ok(Self::new(db))
    }

    /// A service over a fresh in-memory database.
    pub async fn in_memory() -> DbResult<Self> {
        Ok(Self::new(Database::new(DbConfig::in_memory()).await?))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn locks(&self) -> &EntityLocks {
        &self.locks
    }

    /// Closes the pool. Commands fail afterwards.
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}
