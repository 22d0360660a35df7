/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Inbound event type.
//!
//! This module defines the unit of work submitted to the Sequencer: one
//! producer-numbered event for one key.

use bytes::Bytes;

/// An event delivered by the upstream producer.
///
/// Sequence numbers are per key, dense and start at `1`. The Sequencer never
/// assigns them; it only orders by them.
///
/// # Examples
///
/// ```
/// use rocket_inventory::sequencer::InboundEvent;
///
/// let event = InboundEvent::new(
///     "193270a9-c9cf-404a-8f83-838e71d9ae67",
///     1,
///     "RocketLaunched",
///     r#"{"type":"Falcon-9","launchSpeed":500,"mission":"ARTEMIS"}"#,
/// );
/// assert_eq!(event.sequence_num, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Identity of the ordered stream (the rocket channel).
    pub key: String,

    /// Producer-assigned position within the key's stream.
    pub sequence_num: u64,

    /// Event-type tag resolved by the transition registry.
    pub kind: String,

    /// Opaque payload handed to the transition.
    pub payload: Bytes,
}

impl InboundEvent {
    /// Creates a new inbound event.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        sequence_num: u64,
        kind: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            key: key.into(),
            sequence_num,
            kind: kind.into(),
            payload: payload.into(),
        }
    }
}
