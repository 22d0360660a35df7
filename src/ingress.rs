/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Ingress adapter.
//!
//! Decodes the JSON wire message posted by rocket producers into an
//! [`InboundEvent`] and maps Sequencer errors onto transport response
//! classes. The transport itself lives outside this crate.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "metadata": {
//!     "channel": "193270a9-c9cf-404a-8f83-838e71d9ae67",
//!     "messageNumber": 1,
//!     "messageTime": "2022-02-02T19:39:05.86337+01:00",
//!     "messageType": "RocketLaunched"
//!   },
//!   "message": { "type": "Falcon-9", "launchSpeed": 500, "mission": "ARTEMIS" }
//! }
//! ```

use crate::sequencer::{InboundEvent, SequencerError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding a wire message. Always a client error.
#[derive(Debug, Error)]
pub enum IngressError {
    /// The body is not a valid message envelope.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `metadata.channel` is empty.
    #[error("metadata.channel must not be empty")]
    EmptyChannel,

    /// `metadata.messageType` is empty.
    #[error("metadata.messageType must not be empty")]
    EmptyMessageType,

    /// `metadata.messageNumber` is not a positive integer.
    #[error("metadata.messageNumber must be positive, got {0}")]
    InvalidMessageNumber(i64),
}

/// Envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Rocket channel; the ordering key.
    pub channel: String,

    /// Producer-assigned sequence number within the channel.
    pub message_number: i64,

    /// Producer timestamp. Informational only.
    #[serde(default)]
    pub message_time: Option<String>,

    /// Event-type tag, e.g. `RocketLaunched`.
    pub message_type: String,
}

/// A complete wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketMessage {
    /// Envelope metadata.
    pub metadata: Metadata,

    /// Kind-specific body, passed on verbatim as the event payload.
    pub message: serde_json::Value,
}

impl RocketMessage {
    /// Validates the envelope and converts it into an [`InboundEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`IngressError`] if the metadata is invalid.
    pub fn into_event(self) -> Result<InboundEvent, IngressError> {
        let Metadata {
            channel,
            message_number,
            message_type,
            ..
        } = self.metadata;

        if channel.is_empty() {
            return Err(IngressError::EmptyChannel);
        }
        if message_type.is_empty() {
            return Err(IngressError::EmptyMessageType);
        }
        let sequence_num = u64::try_from(message_number)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(IngressError::InvalidMessageNumber(message_number))?;

        let payload = serde_json::to_vec(&self.message)?;
        Ok(InboundEvent::new(channel, sequence_num, message_type, payload))
    }
}

/// Decodes a wire message body into an [`InboundEvent`].
///
/// # Errors
///
/// Returns [`IngressError`] if the body is malformed or its metadata invalid.
pub fn decode(body: &[u8]) -> Result<InboundEvent, IngressError> {
    let message: RocketMessage = serde_json::from_slice(body)?;
    message.into_event()
}

/// Transport-level classification of a submission result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// Accepted, whether applied, buffered or discarded as a duplicate.
    Ok,
    /// The event itself was committed, but a buffered successor it unblocked
    /// was rejected. See [`SequencerError::DrainAborted`].
    Accepted,
    /// The request is at fault; retrying it unchanged will fail again.
    ClientError,
    /// The service is at fault; the producer may retry.
    ServerError,
}

impl ResponseClass {
    /// Classifies a Sequencer error.
    ///
    /// [`SequencerError::DrainAborted`] is not a rejection of the submitted
    /// event, so it maps to [`ResponseClass::Accepted`].
    #[must_use]
    pub fn of(err: &SequencerError) -> Self {
        match err {
            SequencerError::DrainAborted { .. } => Self::Accepted,
            err if err.is_retryable() => Self::ServerError,
            _ => Self::ClientError,
        }
    }

    /// Conventional HTTP status code for this class.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Accepted => 202,
            Self::ClientError => 400,
            Self::ServerError => 500,
        }
    }
}

impl From<&IngressError> for ResponseClass {
    fn from(_: &IngressError) -> Self {
        Self::ClientError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::transition::TransitionError;

    fn body(channel: &str, number: i64, kind: &str) -> String {
        format!(
            r#"{{"metadata":{{"channel":"{channel}","messageNumber":{number},"messageTime":"2022-02-02T19:39:05.86337+01:00","messageType":"{kind}"}},"message":{{"by":100}}}}"#
        )
    }

    #[test]
    fn test_decode_valid_message() {
        let event = decode(body("ch-1", 7, "RocketSpeedIncreased").as_bytes()).unwrap();
        assert_eq!(event.key, "ch-1");
        assert_eq!(event.sequence_num, 7);
        assert_eq!(event.kind, "RocketSpeedIncreased");
        let payload: serde_json::Value = serde_json::from_slice(&event.payload).unwrap();
        assert_eq!(payload, serde_json::json!({"by": 100}));
    }

    #[test]
    fn test_decode_rejects_bad_envelopes() {
        assert!(matches!(
            decode(b"not json"),
            Err(IngressError::Malformed(_))
        ));
        assert!(matches!(
            decode(body("", 1, "RocketExploded").as_bytes()),
            Err(IngressError::EmptyChannel)
        ));
        assert!(matches!(
            decode(body("ch", 0, "RocketExploded").as_bytes()),
            Err(IngressError::InvalidMessageNumber(0))
        ));
        assert!(matches!(
            decode(body("ch", -3, "RocketExploded").as_bytes()),
            Err(IngressError::InvalidMessageNumber(-3))
        ));
        assert!(matches!(
            decode(body("ch", 1, "").as_bytes()),
            Err(IngressError::EmptyMessageType)
        ));
    }

    #[test]
    fn test_message_time_is_optional() {
        let event = decode(
            br#"{"metadata":{"channel":"ch","messageNumber":1,"messageType":"RocketExploded"},"message":{}}"#,
        )
        .unwrap();
        assert_eq!(event.sequence_num, 1);
    }

    #[test]
    fn test_response_classes() {
        let validation = SequencerError::from(TransitionError::UnknownKind("Bogus".into()));
        assert_eq!(ResponseClass::of(&validation), ResponseClass::ClientError);

        let storage = SequencerError::from(StoreError::Unavailable("down".into()));
        assert_eq!(ResponseClass::of(&storage), ResponseClass::ServerError);
        assert_eq!(ResponseClass::of(&storage).status_code(), 500);

        let full = SequencerError::BufferFull {
            key: "ch".into(),
            capacity: 1,
        };
        assert_eq!(ResponseClass::of(&full), ResponseClass::ServerError);

        let drain = SequencerError::DrainAborted {
            key: "ch".into(),
            sequence_num: 2,
            watermark: 1,
            source: TransitionError::UnknownKind("Bogus".into()),
        };
        assert_eq!(ResponseClass::of(&drain), ResponseClass::Accepted);
        assert_eq!(ResponseClass::of(&drain).status_code(), 202);
    }
}
