//! Domain events and the envelope they travel in.
//!
//! A handler builds a typed event (`SessionStarted`, `HandRaised`, ...), then
//! wraps it with [`SerializableDomainEvent::to_envelope`] using the sequence
//! its room mutation committed. Everything downstream of the publisher only
//! sees [`EventEnvelope`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{DomainError, ErrorCode, EventId, SessionId, Timestamp};

/// Aggregate type stamped on every envelope this crate produces.
pub const LIVE_SESSION_AGGREGATE: &str = "LiveSession";

/// Routing facts every domain event exposes.
///
/// Implemented through [`domain_event!`](crate::domain_event).
pub trait DomainEvent: Send + Sync {
    /// Versioned wire name, e.g. "participant.joined.v1".
    fn event_type(&self) -> &'static str;

    /// Session id of the emitting room.
    fn aggregate_id(&self) -> String;

    fn aggregate_type(&self) -> &'static str;

    fn occurred_at(&self) -> Timestamp;

    fn event_id(&self) -> EventId;
}

/// Envelope conversion, available on every serializable event.
pub trait SerializableDomainEvent: DomainEvent + Serialize {
    /// # Errors
    ///
    /// - `SerializationError` if the payload cannot be encoded as JSON
    fn to_envelope(&self, sequence: u64) -> Result<EventEnvelope, DomainError> {
        let payload = serde_json::to_value(self).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("cannot encode {}: {}", self.event_type(), e),
            )
        })?;

        let mut envelope = EventEnvelope::new(
            self.event_type(),
            self.aggregate_id(),
            self.aggregate_type(),
            sequence,
            payload,
        );
        envelope.event_id = self.event_id();
        envelope.occurred_at = self.occurred_at();
        Ok(envelope)
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Implements [`DomainEvent`] for a struct from its field names.
///
/// The aggregate type is always `LiveSession`.
///
/// ```ignore
/// domain_event!(
///     SessionStarted,
///     event_type = "session.started.v1",
///     aggregate_id = session_id,
///     occurred_at = started_at,
///     event_id = event_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event:ident,
        event_type = $event_type:expr,
        aggregate_id = $session_field:ident,
        occurred_at = $at_field:ident,
        event_id = $id_field:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn aggregate_id(&self) -> String {
                self.$session_field.to_string()
            }

            fn aggregate_type(&self) -> &'static str {
                $crate::domain::foundation::LIVE_SESSION_AGGREGATE
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$at_field
            }

            fn event_id(&self) -> $crate::domain::foundation::EventId {
                self.$id_field
            }
        }
    };
}

pub use crate::domain_event;

/// Who and what request caused an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Actor of the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// What subscribers receive.
///
/// `sequence` is the room's commit counter: it increases by one for every
/// accepted mutation of the session, and subscribers order and deduplicate
/// on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,
    pub event_type: String,
    /// Parsed from the `.vN` suffix of `event_type`.
    pub schema_version: u32,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub sequence: u64,
    pub occurred_at: Timestamp,
    pub payload: JsonValue,
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        sequence: u64,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        Self {
            event_id: EventId::new(),
            schema_version: schema_version_of(&event_type),
            event_type,
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            sequence,
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    /// `None` when the aggregate id does not parse as a session id.
    pub fn session_id(&self) -> Option<SessionId> {
        self.aggregate_id.parse().ok()
    }

    /// "session.started.v1" → "session.started".
    pub fn base_type(&self) -> &str {
        split_version(&self.event_type).map_or(self.event_type.as_str(), |(base, _)| base)
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(id.into());
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.trace_id = Some(id.into());
        self
    }

    /// Decode the payload back into its typed event.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

fn split_version(event_type: &str) -> Option<(&str, u32)> {
    let (base, version) = event_type.rsplit_once(".v")?;
    version.parse().ok().map(|v| (base, v))
}

/// Unversioned names count as version 1.
fn schema_version_of(event_type: &str) -> u32 {
    split_version(event_type).map_or(1, |(_, v)| v)
}
