/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Sequencer result types.
//!
//! This module defines what happened to an event after it was submitted.
//! Duplicates and gaps are normal protocol states, not errors.

/// Outcome of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The event was applied, followed by `drained` buffered successors.
    Applied {
        /// Number of buffered events applied after this one.
        drained: usize,
    },

    /// The event arrived ahead of its predecessor and is held in the buffer.
    Buffered,

    /// The event was already applied; nothing changed.
    Duplicate,
}

impl SubmitOutcome {
    /// Returns `true` if the event was applied in this call.
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Returns `true` if the event is waiting in the reorder buffer.
    #[inline]
    #[must_use]
    pub fn is_buffered(&self) -> bool {
        matches!(self, Self::Buffered)
    }

    /// Returns `true` if the event was discarded as a duplicate.
    #[inline]
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }
}
