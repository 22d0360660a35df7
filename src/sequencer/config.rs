/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequencer configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a [`Sequencer`](super::Sequencer).
///
/// Deserializable so it can be embedded in a host's configuration file.
/// Missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use rocket_inventory::sequencer::SequencerConfig;
///
/// let config: SequencerConfig =
///     serde_json::from_str(r#"{"buffer_capacity_per_key": 256}"#).unwrap();
/// assert_eq!(config.buffer_capacity_per_key, Some(256));
/// assert!(!config.evict_idle_locks);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Maximum number of out-of-order events held per key.
    ///
    /// `None` means unbounded. When the limit is reached further gap events
    /// are rejected with a retryable error.
    pub buffer_capacity_per_key: Option<usize>,

    /// Drop a key's lock handle once no caller holds or awaits it and its
    /// reorder buffer is empty.
    ///
    /// Keeps the lock registry bounded when key cardinality is not.
    pub evict_idle_locks: bool,
}

impl SequencerConfig {
    /// Sets the per-key buffer capacity.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity_per_key = Some(capacity);
        self
    }

    /// Enables eviction of idle lock handles.
    #[must_use]
    pub fn with_idle_lock_eviction(mut self) -> Self {
        self.evict_idle_locks = true;
        self
    }
}
