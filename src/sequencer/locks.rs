/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Per-key lock registry.
//!
//! Each key gets its own async mutex, created on first use. Fetching or
//! creating a handle only touches one [`DashMap`] shard for O(1) work; the
//! shard is never held while the per-key lock is held.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive hold on one key. Releases the lock on drop.
pub type KeyGuard = OwnedMutexGuard<()>;

/// Registry mapping keys to their mutual-exclusion handles.
#[derive(Debug, Default)]
pub struct KeyLockRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Returns the handle for `key`, creating it if absent.
    ///
    /// Two concurrent first arrivals for the same key always observe the same
    /// handle: creation goes through the shard's entry lock.
    #[must_use]
    pub fn handle(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(key) {
            return Arc::clone(lock.value());
        }
        Arc::clone(self.locks.entry(key.to_string()).or_default().value())
    }

    /// Waits until the caller holds the lock for `key`.
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        self.handle(key).lock_owned().await
    }

    /// Removes the handle for `key` if nobody holds or awaits it.
    ///
    /// Every holder and waiter owns a clone of the handle, so a strong count
    /// of one means only the registry references it. The check runs under the
    /// shard's write lock, so no caller can fetch the handle concurrently.
    pub fn evict_if_idle(&self, key: &str) -> bool {
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1)
            .is_some()
    }

    /// Number of keys with a live handle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns `true` if no handles exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
