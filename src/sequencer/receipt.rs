/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequencer receipt types.
//!
//! This module defines the receipt returned to callers after submitting
//! an event to the Sequencer.

use super::result::SubmitOutcome;

/// Receipt returned after submitting an event to the Sequencer.
///
/// Contains the submitted position, what happened to it, and the key's
/// committed watermark once the call finished.
///
/// # Examples
///
/// ```
/// use rocket_inventory::sequencer::{SequencerReceipt, SubmitOutcome};
///
/// let receipt = SequencerReceipt::new("ch-1", 3, SubmitOutcome::Buffered, 1);
/// assert_eq!(receipt.sequence_num, 3);
/// assert!(!receipt.is_applied());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerReceipt {
    /// Key the event belongs to.
    pub key: String,

    /// Sequence number of the submitted event.
    pub sequence_num: u64,

    /// What happened to the event.
    pub outcome: SubmitOutcome,

    /// Watermark of the key after this call.
    pub watermark: u64,
}

impl SequencerReceipt {
    /// Creates a new receipt.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        sequence_num: u64,
        outcome: SubmitOutcome,
        watermark: u64,
    ) -> Self {
        Self {
            key: key.into(),
            sequence_num,
            outcome,
            watermark,
        }
    }

    /// Returns `true` if the event was applied in this call.
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }
}
