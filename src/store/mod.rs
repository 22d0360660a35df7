/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Aggregate store interface.
//!
//! The store owns the durable `key -> aggregate` mapping. The sequencer only
//! ever touches it through a [`StoreTransaction`]: it reads the watermark,
//! writes the next aggregate, and commits or rolls back. The read path goes
//! straight to [`AggregateStore::get`] and [`AggregateStore::list`].
//!
//! The watermark lives in the same row as the rocket fields, so advancing it
//! and changing state is always a single write.

pub mod memory;

pub use memory::{InMemoryAggregateStore, InMemoryTransaction};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by an aggregate store.
///
/// [`StoreError::Unavailable`] and [`StoreError::CommitFailed`] are storage
/// failures the caller may retry. [`StoreError::MissingRow`] is deterministic;
/// the transition registry reports it as a missing aggregate.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An update targeted a row that does not exist.
    #[error("no aggregate row for key {key}")]
    MissingRow {
        /// Key of the missing row.
        key: String,
    },

    /// The transaction could not be committed.
    #[error("commit failed: {0}")]
    CommitFailed(String),
}

/// Persisted state of one rocket channel.
///
/// A key without a row behaves as an aggregate with every field absent and
/// a watermark of `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Channel identifier. Immutable.
    #[serde(rename = "channel")]
    pub key: String,

    /// Rocket type.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Current speed. Never negative.
    pub speed: Option<i64>,

    /// Current mission.
    pub mission: Option<String>,

    /// Lifecycle status, e.g. `"launched"` or `"exploded"`.
    pub status: Option<String>,

    /// Highest sequence number applied to this aggregate.
    pub watermark: u64,
}

impl Aggregate {
    /// Creates an empty aggregate for `key` at watermark `0`.
    #[must_use]
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: None,
            speed: None,
            mission: None,
            status: None,
            watermark: 0,
        }
    }

    /// Sets the speed, returning the modified aggregate.
    #[must_use]
    pub fn with_speed(mut self, speed: i64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Sets the watermark, returning the modified aggregate.
    #[must_use]
    pub fn with_watermark(mut self, watermark: u64) -> Self {
        self.watermark = watermark;
        self
    }
}

/// Durable storage for aggregates.
///
/// Implementations must be safe to share between tasks. Transactions for
/// different keys may run concurrently; the sequencer guarantees that at most
/// one transaction per key is open at a time.
pub trait AggregateStore: Send + Sync {
    /// Transaction type handed out by [`begin`](Self::begin).
    type Txn<'a>: StoreTransaction
    where
        Self: 'a;

    /// Opens a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot start a transaction.
    fn begin(&self) -> Result<Self::Txn<'_>, StoreError>;

    /// Reads the committed aggregate for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn get(&self, key: &str) -> Result<Option<Aggregate>, StoreError>;

    /// Returns every committed aggregate, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn list(&self) -> Result<Vec<Aggregate>, StoreError>;
}

/// A read-modify-write unit of work against an [`AggregateStore`].
///
/// Dropping a transaction without committing it rolls it back.
pub trait StoreTransaction {
    /// Returns the watermark for `key`, or `0` if the key has no row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn read_watermark(&mut self, key: &str) -> Result<u64, StoreError> {
        Ok(self.read(key)?.map_or(0, |aggregate| aggregate.watermark))
    }

    /// Reads the aggregate for `key`, including writes staged in this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn read(&mut self, key: &str) -> Result<Option<Aggregate>, StoreError>;

    /// Creates or replaces the row for `aggregate.key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on storage failure.
    fn upsert(&mut self, aggregate: Aggregate) -> Result<(), StoreError>;

    /// Replaces an existing row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingRow`] if no row exists for `aggregate.key`.
    fn update(&mut self, aggregate: Aggregate) -> Result<(), StoreError>;

    /// Publishes every staged write atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the writes could not be published; nothing
    /// is visible in that case.
    fn commit(self) -> Result<(), StoreError>;

    /// Discards every staged write.
    fn rollback(self);
}
