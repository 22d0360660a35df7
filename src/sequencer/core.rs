/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Core Sequencer implementation.
//!
//! This module provides the main Sequencer struct that applies inbound events
//! to their key's aggregate exactly once and strictly in sequence order,
//! whatever order the transport delivered them in.

use super::buffer::{Buffered, ReorderBuffer};
use super::config::SequencerConfig;
use super::event::InboundEvent;
use super::locks::KeyLockRegistry;
use super::receipt::SequencerReceipt;
use super::result::SubmitOutcome;
use crate::store::{AggregateStore, StoreError, StoreTransaction};
use crate::transition::{TransitionError, TransitionRegistry};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors that can occur when submitting to the Sequencer.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// The event was rejected by its transition. Deterministic; never retry.
    #[error(transparent)]
    Validation(TransitionError),

    /// The store failed. Nothing from this call was committed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The event is ahead of the watermark and the key's buffer is full.
    #[error("reorder buffer for key {key} is full ({capacity} events)")]
    BufferFull {
        /// Key whose buffer is full.
        key: String,
        /// Configured per-key capacity.
        capacity: usize,
    },

    /// The submitted event was applied, but a buffered successor was rejected.
    ///
    /// Everything up to `watermark` is committed. The rejected event has been
    /// dropped; events after it stay buffered until a valid event numbered
    /// `sequence_num` is delivered.
    ///
    /// The submitted event is among the committed ones, so this is not a
    /// rejection of it. A corrected redelivery of `sequence_num` resumes the drain.
    #[error("drain of key {key} stopped at sequence {sequence_num} (watermark {watermark}): {source}")]
    DrainAborted {
        /// Key being drained.
        key: String,
        /// Sequence number of the rejected buffered event.
        sequence_num: u64,
        /// Committed watermark after the partial drain.
        watermark: u64,
        /// Why the buffered event was rejected.
        #[source]
        source: TransitionError,
    },
}

impl From<TransitionError> for SequencerError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Store(err) => Self::Storage(err),
            other => Self::Validation(other),
        }
    }
}

impl SequencerError {
    /// Returns `true` if resubmitting the same event may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::BufferFull { .. })
    }

    /// Returns `true` if the error stems from an invalid event.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::DrainAborted { .. })
    }
}

/// Ordered, idempotent applier of per-key event streams.
///
/// Safe to share between tasks (wrap it in an [`Arc`]). Submissions for the
/// same key are serialized by a per-key lock; submissions for different keys
/// run in parallel.
///
/// # Examples
///
/// ```
/// use rocket_inventory::sequencer::{InboundEvent, Sequencer};
/// use rocket_inventory::store::{AggregateStore, InMemoryAggregateStore};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sequencer = Sequencer::new(Arc::new(InMemoryAggregateStore::new()));
///
/// let early = InboundEvent::new("ch-1", 2, "RocketSpeedIncreased", r#"{"by":300}"#);
/// assert!(sequencer.submit(early).await?.outcome.is_buffered());
///
/// let launch = InboundEvent::new(
///     "ch-1",
///     1,
///     "RocketLaunched",
///     r#"{"type":"Falcon-9","launchSpeed":500,"mission":"ARTEMIS"}"#,
/// );
/// let receipt = sequencer.submit(launch).await?;
/// assert_eq!(receipt.watermark, 2);
/// assert_eq!(sequencer.store().get("ch-1")?.unwrap().speed, Some(800));
/// # Ok(())
/// # }
/// ```
pub struct Sequencer<S: AggregateStore> {
    /// Durable aggregate state.
    store: Arc<S>,

    /// Event kind to transition dispatch.
    registry: TransitionRegistry,

    /// Per-key mutual exclusion.
    locks: KeyLockRegistry,

    /// Events waiting for their predecessor.
    buffer: ReorderBuffer,

    config: SequencerConfig,
}

impl<S: AggregateStore> Sequencer<S> {
    /// Creates a Sequencer with the built-in rocket transitions and default
    /// configuration.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(
            store,
            TransitionRegistry::with_defaults(),
            SequencerConfig::default(),
        )
    }

    /// Creates a Sequencer with a custom registry and configuration.
    #[must_use]
    pub fn with_config(
        store: Arc<S>,
        registry: TransitionRegistry,
        config: SequencerConfig,
    ) -> Self {
        Self {
            store,
            registry,
            locks: KeyLockRegistry::new(),
            buffer: ReorderBuffer::new(config.buffer_capacity_per_key),
            config,
        }
    }

    /// Submits an event for ordered application.
    ///
    /// Depending on the key's watermark the event is applied (followed by any
    /// buffered successors it unblocks), held in the reorder buffer, or
    /// discarded as a duplicate. Waits without timeout for the key's lock.
    ///
    /// # Errors
    ///
    /// - [`SequencerError::Validation`] if the event's transition rejects it;
    ///   the watermark is unchanged and the event is not buffered
    /// - [`SequencerError::Storage`] if the store fails; nothing is committed
    /// - [`SequencerError::BufferFull`] if the event must be buffered but the
    ///   key's buffer is at capacity
    /// - [`SequencerError::DrainAborted`] if the event applied but a buffered
    ///   successor was rejected
    pub async fn submit(&self, event: InboundEvent) -> Result<SequencerReceipt, SequencerError> {
        let key = event.key.clone();
        let guard = self.locks.acquire(&key).await;

        let result = self.submit_locked(event);
        self.buffer.prune(&key);
        drop(guard);

        if self.config.evict_idle_locks && self.buffer.is_empty(&key) {
            self.locks.evict_if_idle(&key);
        }
        result
    }

    /// Runs one submission. The caller holds the key's lock.
    fn submit_locked(&self, event: InboundEvent) -> Result<SequencerReceipt, SequencerError> {
        let mut txn = self.store.begin()?;
        let watermark = txn.read_watermark(&event.key)?;

        if event.sequence_num <= watermark {
            debug!(
                key = event.key.as_str(),
                sequence_num = event.sequence_num,
                watermark,
                "discarding already applied event"
            );
            txn.commit()?;
            return Ok(SequencerReceipt::new(
                event.key,
                event.sequence_num,
                SubmitOutcome::Duplicate,
                watermark,
            ));
        }

        if event.sequence_num > watermark.saturating_add(1) {
            txn.commit()?;
            return self.hold(event, watermark);
        }

        let key = event.key;
        let sequence_num = event.sequence_num;
        if let Err(err) =
            self.registry
                .apply(&mut txn, &event.kind, &key, sequence_num, &event.payload)
        {
            txn.rollback();
            warn!(key = key.as_str(), sequence_num, error = %err, "event rejected");
            return Err(err.into());
        }

        let mut watermark = sequence_num;
        let mut drained: Vec<InboundEvent> = Vec::new();
        let mut rejected = None;

        while let Some(next) = self.buffer.take_next(&key, watermark.saturating_add(1)) {
            match self
                .registry
                .apply(&mut txn, &next.kind, &key, next.sequence_num, &next.payload)
            {
                Ok(_) => {
                    watermark = next.sequence_num;
                    drained.push(next);
                }
                Err(err) if err.is_validation() => {
                    error!(
                        key = key.as_str(),
                        sequence_num = next.sequence_num,
                        watermark,
                        error = %err,
                        "buffered event rejected, stopping drain"
                    );
                    rejected = Some((next.sequence_num, err));
                    break;
                }
                Err(err) => {
                    txn.rollback();
                    drained.push(next);
                    self.buffer.restore(drained);
                    return Err(err.into());
                }
            }
        }

        if let Err(err) = txn.commit() {
            self.buffer.restore(drained);
            return Err(err.into());
        }

        if !drained.is_empty() {
            debug!(
                key = key.as_str(),
                drained = drained.len(),
                watermark,
                "drained buffered events"
            );
        }

        match rejected {
            Some((rejected_seq, source)) => Err(SequencerError::DrainAborted {
                key,
                sequence_num: rejected_seq,
                watermark,
                source,
            }),
            None => Ok(SequencerReceipt::new(
                key,
                sequence_num,
                SubmitOutcome::Applied {
                    drained: drained.len(),
                },
                watermark,
            )),
        }
    }

    /// Parks an event that arrived ahead of the watermark.
    fn hold(
        &self,
        event: InboundEvent,
        watermark: u64,
    ) -> Result<SequencerReceipt, SequencerError> {
        let key = event.key.clone();
        let sequence_num = event.sequence_num;

        match self.buffer.insert(event) {
            Ok(Buffered::Inserted) => {
                debug!(key = key.as_str(), sequence_num, watermark, "buffered out-of-order event");
            }
            Ok(Buffered::AlreadyHeld) => {
                debug!(key = key.as_str(), sequence_num, watermark, "event already buffered");
            }
            Err(full) => {
                warn!(key = key.as_str(), sequence_num, capacity = full.capacity, "reorder buffer full");
                return Err(SequencerError::BufferFull {
                    key,
                    capacity: full.capacity,
                });
            }
        }

        Ok(SequencerReceipt::new(
            key,
            sequence_num,
            SubmitOutcome::Buffered,
            watermark,
        ))
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Number of events held in the reorder buffer for `key`.
    #[must_use]
    pub fn buffered_len(&self, key: &str) -> usize {
        self.buffer.len(key)
    }

    /// Sequence numbers held in the reorder buffer for `key`, ascending.
    #[must_use]
    pub fn buffered(&self, key: &str) -> Vec<u64> {
        self.buffer.held(key)
    }

    /// Number of keys with a live lock handle.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.locks.len()
    }
}

impl<S: AggregateStore> std::fmt::Debug for Sequencer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("registry", &self.registry)
            .field("tracked_keys", &self.locks.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
