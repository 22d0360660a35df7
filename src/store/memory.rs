/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! In-memory implementation of [`AggregateStore`].
//!
//! Rows live in a [`DashMap`]. A transaction stages its writes privately and
//! publishes them on commit, so an aborted transaction leaves no trace.
//! Suitable for tests, benchmarks and single-process deployments where the
//! aggregate state does not need to survive a restart.

use super::{Aggregate, AggregateStore, StoreError, StoreTransaction};
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::trace;

/// Aggregate store backed by a concurrent hash map.
///
/// # Examples
///
/// ```
/// use rocket_inventory::store::{Aggregate, AggregateStore, InMemoryAggregateStore, StoreTransaction};
///
/// let store = InMemoryAggregateStore::new();
/// let mut txn = store.begin().unwrap();
/// txn.upsert(Aggregate::empty("ch-1").with_speed(100).with_watermark(1)).unwrap();
/// txn.commit().unwrap();
///
/// assert_eq!(store.get("ch-1").unwrap().unwrap().speed, Some(100));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAggregateStore {
    rows: DashMap<String, Aggregate>,
}

impl InMemoryAggregateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// Inserts a committed row directly, bypassing transactions.
    pub fn seed(&self, aggregate: Aggregate) {
        self.rows.insert(aggregate.key.clone(), aggregate);
    }

    /// Returns the number of committed rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no rows have been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl AggregateStore for InMemoryAggregateStore {
    type Txn<'a> = InMemoryTransaction<'a>;

    fn begin(&self) -> Result<Self::Txn<'_>, StoreError> {
        Ok(InMemoryTransaction {
            store: self,
            staged: HashMap::new(),
        })
    }

    fn get(&self, key: &str) -> Result<Option<Aggregate>, StoreError> {
        Ok(self.rows.get(key).map(|row| row.value().clone()))
    }

    fn list(&self) -> Result<Vec<Aggregate>, StoreError> {
        Ok(self.rows.iter().map(|row| row.value().clone()).collect())
    }
}

/// Transaction over an [`InMemoryAggregateStore`].
#[derive(Debug)]
pub struct InMemoryTransaction<'a> {
    store: &'a InMemoryAggregateStore,
    staged: HashMap<String, Aggregate>,
}

impl InMemoryTransaction<'_> {
    fn exists(&self, key: &str) -> bool {
        self.staged.contains_key(key) || self.store.rows.contains_key(key)
    }
}

impl StoreTransaction for InMemoryTransaction<'_> {
    fn read(&mut self, key: &str) -> Result<Option<Aggregate>, StoreError> {
        if let Some(staged) = self.staged.get(key) {
            return Ok(Some(staged.clone()));
        }
        self.store.get(key)
    }

    fn upsert(&mut self, aggregate: Aggregate) -> Result<(), StoreError> {
        self.staged.insert(aggregate.key.clone(), aggregate);
        Ok(())
    }

    fn update(&mut self, aggregate: Aggregate) -> Result<(), StoreError> {
        if !self.exists(&aggregate.key) {
            return Err(StoreError::MissingRow { key: aggregate.key });
        }
        self.staged.insert(aggregate.key.clone(), aggregate);
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        trace!(rows = self.staged.len(), "committing in-memory transaction");
        for (key, aggregate) in self.staged {
            self.store.rows.insert(key, aggregate);
        }
        Ok(())
    }

    fn rollback(self) {
        trace!(rows = self.staged.len(), "rolling back in-memory transaction");
    }
}
