//! Session lifecycle events.
//!
//! Events published when the session itself changes:
//! - `SessionCreated` - New session created (always sequence 1)
//! - `SessionStarted` - Scheduled session went live
//! - `SessionEnded` - Live session ended
//! - `SessionCancelled` - Scheduled session cancelled
//! - `SessionDeleted` - Session removed by its host
//! - `RecordingStatusChanged` - Recording flag toggled

use serde::{Deserialize, Serialize};

use super::{Session, SessionStatus};
use crate::domain::foundation::{domain_event, EventId, SessionId, Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════
// SessionCreated
// ════════════════════════════════════════════════════════════════════════════

/// Published when a host creates a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub event_id: EventId,
    pub session_id: SessionId,

    /// Host who created the session.
    pub host_id: UserId,

    pub title: String,
    pub description: Option<String>,

    /// Initial status: `scheduled`, or `live` when no schedule was given.
    pub status: SessionStatus,

    pub max_participants: Option<u32>,
    pub scheduled_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

domain_event!(
    SessionCreated,
    event_type = "session.created.v1",
    aggregate_id = session_id,
    occurred_at = created_at,
    event_id = event_id
);

impl SessionCreated {
    pub fn from_session(session: &Session) -> Self {
        Self {
            event_id: EventId::new(),
            session_id: *session.id(),
            host_id: session.host_id().clone(),
            title: session.title().to_string(),
            description: session.description().map(str::to_string),
            status: session.status(),
            max_participants: session.max_participants(),
            scheduled_at: session.scheduled_at().copied(),
            created_at: *session.created_at(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SessionStarted
// ════════════════════════════════════════════════════════════════════════════

/// Published when a scheduled session goes live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    pub event_id: EventId,
    pub session_id: SessionId,

    /// Host or co-host who started the session.
    pub started_by: UserId,

    pub started_at: Timestamp,
}

domain_event!(
    SessionStarted,
    event_type = "session.started.v1",
    aggregate_id = session_id,
    occurred_at = started_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionEnded
// ════════════════════════════════════════════════════════════════════════════

/// Published when a live session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnded {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub ended_by: UserId,
    pub ended_at: Timestamp,

    /// Whole seconds the session was live.
    pub duration_seconds: i64,

    /// Participants whose membership closed with the session.
    pub participants_released: usize,
}

domain_event!(
    SessionEnded,
    event_type = "session.ended.v1",
    aggregate_id = session_id,
    occurred_at = ended_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionCancelled
// ════════════════════════════════════════════════════════════════════════════

/// Published when a scheduled session is called off before going live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCancelled {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub cancelled_by: UserId,
    pub cancelled_at: Timestamp,
}

domain_event!(
    SessionCancelled,
    event_type = "session.cancelled.v1",
    aggregate_id = session_id,
    occurred_at = cancelled_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SessionDeleted
// ════════════════════════════════════════════════════════════════════════════

/// Published when the host deletes a session. Last event for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDeleted {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub deleted_by: UserId,

    /// Status the session was in when deleted.
    pub final_status: SessionStatus,

    pub deleted_at: Timestamp,
}

domain_event!(
    SessionDeleted,
    event_type = "session.deleted.v1",
    aggregate_id = session_id,
    occurred_at = deleted_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// RecordingStatusChanged
// ════════════════════════════════════════════════════════════════════════════

/// Published when recording is switched on or off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingStatusChanged {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub changed_by: UserId,
    pub recording_enabled: bool,
    pub changed_at: Timestamp,
}

domain_event!(
    RecordingStatusChanged,
    event_type = "session.recording_changed.v1",
    aggregate_id = session_id,
    occurred_at = changed_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, SerializableDomainEvent};
    use crate::domain::session::NewSession;

    #[test]
    fn session_created_mirrors_session() {
        let now = Timestamp::now();
        let session = Session::create(
            SessionId::new(),
            UserId::new("host").unwrap(),
            NewSession::titled("Weekly sync").with_capacity(10),
            now,
        )
        .unwrap();

        let event = SessionCreated::from_session(&session);
        assert_eq!(event.session_id, *session.id());
        assert_eq!(event.status, SessionStatus::Live);
        assert_eq!(event.max_participants, Some(10));
        assert_eq!(event.event_type(), "session.created.v1");
    }

    #[test]
    fn session_ended_envelope_carries_duration() {
        let event = SessionEnded {
            event_id: EventId::new(),
            session_id: SessionId::new(),
            ended_by: UserId::new("host").unwrap(),
            ended_at: Timestamp::now(),
            duration_seconds: 42,
            participants_released: 3,
        };

        let envelope = event.to_envelope(9).unwrap();
        assert_eq!(envelope.sequence, 9);
        assert_eq!(envelope.aggregate_id, event.session_id.to_string());
        assert_eq!(envelope.payload["duration_seconds"], 42);
    }
}
