/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Transition registry.
//!
//! Maps an event-type tag to a pure [`Transition`] that computes the next
//! [`Aggregate`] from the prior one and a payload. The registry then writes the
//! result through the caller's [`StoreTransaction`], so the state change and
//! the watermark advance land in the same write.

pub mod registry;
pub mod rocket;

pub use registry::TransitionRegistry;
pub use rocket::{
    ExplodedTransition, LaunchedTransition, MissionChangedTransition, SpeedDecreasedTransition,
    SpeedIncreasedTransition,
};

use crate::store::{Aggregate, StoreError};
use thiserror::Error;

/// Errors raised while applying a transition.
///
/// Everything except [`TransitionError::Store`] is a validation error: it is
/// deterministic and must not be retried.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// No transition is registered under this tag.
    #[error("unrecognized transition kind: {0}")]
    UnknownKind(String),

    /// The payload is not valid JSON for this kind.
    #[error("malformed {kind} payload: {source}")]
    Decode {
        /// Tag of the transition that failed to decode.
        kind: &'static str,
        /// Underlying decode error; names the offending field when it can.
        #[source]
        source: serde_json::Error,
    },

    /// A decoded field carries a value the transition refuses.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending payload field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// The transition needs an existing aggregate and none was found.
    #[error("no aggregate for key {key}; {kind} requires a launched rocket")]
    MissingAggregate {
        /// Key of the missing aggregate.
        key: String,
        /// Tag of the transition that required it.
        kind: &'static str,
    },

    /// Writing the new aggregate failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransitionError {
    /// Returns `true` for deterministic failures that will repeat on retry.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// How the registry persists the aggregate produced by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the row if absent.
    Upsert,
    /// The row must already exist.
    Update,
}

/// A deterministic state transition for one event kind.
pub trait Transition: Send + Sync {
    /// Tag this transition is registered under.
    fn kind(&self) -> &'static str;

    /// How the produced aggregate is written.
    fn write_mode(&self) -> WriteMode {
        WriteMode::Update
    }

    /// Computes the next aggregate.
    ///
    /// The registry stamps the result with `key` and `watermark = sequence_num`
    /// before writing it.
    ///
    /// # Errors
    ///
    /// Returns a validation [`TransitionError`] if the payload cannot be
    /// decoded or the transition does not apply to `prior`.
    fn apply(
        &self,
        prior: Option<&Aggregate>,
        key: &str,
        sequence_num: u64,
        payload: &[u8],
    ) -> Result<Aggregate, TransitionError>;
}
