/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Reorder buffer.
//!
//! Holds events that arrived before their predecessor, one sorted
//! [`SkipMap`] per key. Entries are unique by sequence number. The buffer is
//! process memory only; anything held here is lost on restart and must be
//! redelivered by the producer.

use super::event::InboundEvent;
use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

/// The key's buffer already holds the configured maximum.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("reorder buffer full ({capacity} events)")]
pub struct BufferFull {
    /// Configured per-key capacity.
    pub capacity: usize,
}

/// Result of offering an event to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffered {
    /// The event is now held.
    Inserted,
    /// An event with this sequence number was already held.
    AlreadyHeld,
}

/// Per-key holding area for not-yet-applicable events.
#[derive(Debug, Default)]
pub struct ReorderBuffer {
    pending: DashMap<String, Arc<SkipMap<u64, InboundEvent>>>,
    capacity: Option<usize>,
}

impl ReorderBuffer {
    /// Creates a buffer with an optional per-key capacity.
    #[must_use]
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            pending: DashMap::new(),
            capacity,
        }
    }

    fn slot(&self, key: &str) -> Option<Arc<SkipMap<u64, InboundEvent>>> {
        self.pending.get(key).map(|slot| Arc::clone(slot.value()))
    }

    fn slot_or_create(&self, key: &str) -> Arc<SkipMap<u64, InboundEvent>> {
        if let Some(slot) = self.slot(key) {
            return slot;
        }
        Arc::clone(self.pending.entry(key.to_string()).or_default().value())
    }

    /// Holds `event` until its predecessors have been applied.
    ///
    /// Offering an already-held sequence number is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BufferFull`] if the key's buffer is at capacity.
    pub fn insert(&self, event: InboundEvent) -> Result<Buffered, BufferFull> {
        let slot = self.slot_or_create(&event.key);
        if slot.contains_key(&event.sequence_num) {
            return Ok(Buffered::AlreadyHeld);
        }
        if let Some(capacity) = self.capacity
            && slot.len() >= capacity
        {
            return Err(BufferFull { capacity });
        }
        slot.insert(event.sequence_num, event);
        Ok(Buffered::Inserted)
    }

    /// Removes and returns the held event numbered `next` for `key`.
    ///
    /// Entries below `next` are stale (already covered by the watermark) and
    /// are discarded on the way.
    pub fn take_next(&self, key: &str, next: u64) -> Option<InboundEvent> {
        let slot = self.slot(key)?;
        while let Some(front) = slot.front() {
            let sequence_num = *front.key();
            if sequence_num > next {
                return None;
            }
            let taken = front.remove();
            if sequence_num == next {
                return taken.then(|| front.value().clone());
            }
        }
        None
    }

    /// Puts previously taken events back, ignoring the capacity limit.
    pub fn restore(&self, events: impl IntoIterator<Item = InboundEvent>) {
        for event in events {
            self.slot_or_create(&event.key)
                .get_or_insert(event.sequence_num, event);
        }
    }

    /// Drops the key's slot if it holds nothing.
    pub fn prune(&self, key: &str) {
        self.pending.remove_if(key, |_, slot| slot.is_empty());
    }

    /// Number of events held for `key`.
    #[must_use]
    pub fn len(&self, key: &str) -> usize {
        self.slot(key).map_or(0, |slot| slot.len())
    }

    /// Returns `true` if nothing is held for `key`.
    #[must_use]
    pub fn is_empty(&self, key: &str) -> bool {
        self.len(key) == 0
    }

    /// Sequence numbers held for `key`, ascending.
    #[must_use]
    pub fn held(&self, key: &str) -> Vec<u64> {
        self.slot(key)
            .map(|slot| slot.iter().map(|entry| *entry.key()).collect())
            .unwrap_or_default()
    }
}
