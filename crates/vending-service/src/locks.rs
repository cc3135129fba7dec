//! # Entity Locks
//!
//! Per-entity async mutexes that serialize read-check-write sequences on the
//! same user or product.
//!
//! ## Lock Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two buyers, one product                              │
//! │                                                                         │
//! │  buy(bob, cola, 2)                   buy(bea, cola, 2)                  │
//! │       │                                   │                             │
//! │  lock User("bob")                    lock User("bea")                   │
//! │       │                                   │                             │
//! │  lock Product(cola) ◄──── waits ──── lock Product(cola)                 │
//! │       │                                   │                             │
//! │  read stock=3, quote, write stock=1       │                             │
//! │  unlock                                   │                             │
//! │                                      read stock=1 → OutOfStock(1)       │
//! │                                                                         │
//! │  Every operation takes its user lock before its product lock, so two    │
//! │  operations can never wait on each other in a cycle.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry is a plain `std::sync::Mutex` held only while looking up the
//! per-entity `tokio::sync::Mutex`; no await happens under it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Registry size above which unused entries are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// What a lock protects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LockKey {
    /// A user's account row, keyed by username.
    User(String),
    /// A product row, keyed by id.
    Product(i64),
}

/// Held lock. The entity is unlocked when this is dropped.
#[derive(Debug)]
pub struct EntityGuard {
    key: LockKey,
    _guard: OwnedMutexGuard<()>,
}

impl EntityGuard {
    pub fn key(&self) -> &LockKey {
        &self.key
    }
}

/// Registry of per-entity locks. Cheap to clone; clones share the registry.
#[derive(Debug, Clone, Default)]
pub struct EntityLocks {
    inner: Arc<Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and takes the lock on `key`.
    pub async fn lock(&self, key: LockKey) -> EntityGuard {
        let mutex = self.entry(&key);
        trace!(?key, "Waiting for entity lock");
        let guard = mutex.lock_owned().await;
        EntityGuard { key, _guard: guard }
    }

    /// Locks a user's account.
    pub async fn lock_user(&self, username: &str) -> EntityGuard {
        self.lock(LockKey::User(username.to_string())).await
    }

    /// Locks a product.
    pub async fn lock_product(&self, id: i64) -> EntityGuard {
        self.lock(LockKey::Product(id)).await
    }

    /// Locks a user, then a product.
    pub async fn lock_user_and_product(
        &self,
        username: &str,
        product_id: i64,
    ) -> (EntityGuard, EntityGuard) {
        let user = self.lock_user(username).await;
        let product = self.lock_product(product_id).await;
        (user, product)
    }

    /// Number of entities with a registered lock.
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, key: &LockKey) -> Arc<AsyncMutex<()>> {
        let mut registry = self.registry();

        if registry.len() > PRUNE_THRESHOLD {
            // Only the registry holds a reference: nobody is locking it.
            registry.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        }

        registry
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, HashMap<LockKey, Arc<AsyncMutex<()>>>> {
        // A panic while holding the registry leaves the map itself intact.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = EntityLocks::new();

        let guard = locks.lock_product(1).await;
        assert_eq!(guard.key(), &LockKey::Product(1));

        let contender = locks.clone();
        let waiting = tokio::spawn(async move { contender.lock_product(1).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        let second = tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.key(), &LockKey::Product(1));
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = EntityLocks::new();

        let (_user, _product) = locks.lock_user_and_product("bob", 1).await;
        let other = tokio::time::timeout(Duration::from_secs(1), locks.lock_user("bea")).await;

        assert!(other.is_ok());
        assert_eq!(locks.len(), 3);
    }

    #[tokio::test]
    async fn test_unused_entries_are_pruned() {
        let locks = EntityLocks::new();

        for id in 0..=(PRUNE_THRESHOLD as i64) {
            drop(locks.lock_product(id).await);
        }
        assert_eq!(locks.len(), PRUNE_THRESHOLD + 1);

        let _held = locks.lock_user("bob").await;
        assert_eq!(locks.len(), 1);
    }
}
