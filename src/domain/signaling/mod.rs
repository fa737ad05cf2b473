//! WebRTC signaling relay.
//!
//! Peers negotiate media directly; the session only forwards their opaque
//! offer/answer/candidate blobs to a named recipient.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, SessionId, Timestamp, UserId};
use crate::domain::room::RoomError;

/// Largest payload the relay forwards.
pub const MAX_SIGNAL_PAYLOAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// Opaque signaling blob. Never inspected beyond its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalPayload(String);

impl SignalPayload {
    pub fn new(raw: impl Into<String>) -> Result<Self, RoomError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(RoomError::validation("payload", "Signal payload cannot be empty"));
        }
        if raw.len() > MAX_SIGNAL_PAYLOAD_BYTES {
            return Err(RoomError::validation(
                "payload",
                format!(
                    "Signal payload is {} bytes, limit is {}",
                    raw.len(),
                    MAX_SIGNAL_PAYLOAD_BYTES
                ),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Published on the session channel; transports deliver it to `recipient_id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRelayed {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub kind: SignalKind,
    pub payload: SignalPayload,
    pub relayed_at: Timestamp,
}

domain_event!(
    SignalRelayed,
    event_type = "signal.relayed.v1",
    aggregate_id = session_id,
    occurred_at = relayed_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_payload_at_limit() {
        let raw = "x".repeat(MAX_SIGNAL_PAYLOAD_BYTES);
        assert_eq!(SignalPayload::new(raw).unwrap().len(), MAX_SIGNAL_PAYLOAD_BYTES);
    }

    #[test]
    fn rejects_oversized_payload() {
        let raw = "x".repeat(MAX_SIGNAL_PAYLOAD_BYTES + 1);
        assert!(matches!(
            SignalPayload::new(raw),
            Err(RoomError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(SignalPayload::new("").is_err());
    }

    #[test]
    fn payload_serializes_as_plain_string() {
        let payload = SignalPayload::new("v=0").unwrap();
        assert_eq!(serde_json::to_string(&payload).unwrap(), "\"v=0\"");
    }
}
