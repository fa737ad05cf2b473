//! Bridge from the event bus to per-session channels.
//!
//! ```text
//! handler commits ─► EventPublisher ─► SessionEventBridge ─► SessionChannels
//!                                                              │
//!                                              ordered stream per session
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::{EventHandler, EventSubscriber};

use super::session_channels::{Delivery, SessionChannels};

/// Every event a session emits. Subscribers of a session see all of them.
pub const SESSION_EVENT_TYPES: &[&str] = &[
    "session.created.v1",
    "session.started.v1",
    "session.ended.v1",
    "session.cancelled.v1",
    "session.deleted.v1",
    "session.recording_changed.v1",
    "participant.joined.v1",
    "participant.left.v1",
    "participant.hand_raised.v1",
    "participant.hand_lowered.v1",
    "participant.role_changed.v1",
    "participant.muted_status_changed.v1",
    "participant.removed.v1",
    "message.sent.v1",
    "message.pinned_status_changed.v1",
    "signal.relayed.v1",
];

pub struct SessionEventBridge {
    channels: Arc<SessionChannels>,
}

impl SessionEventBridge {
    pub fn new(channels: Arc<SessionChannels>) -> Self {
        Self { channels }
    }

    pub fn new_shared(channels: Arc<SessionChannels>) -> Arc<Self> {
        Arc::new(Self::new(channels))
    }

    /// Subscribe this bridge to every session event type.
    ///
    /// ```ignore
    /// let bridge = SessionEventBridge::new_shared(channels);
    /// bridge.register(&event_bus);
    /// ```
    pub fn register(self: &Arc<Self>, subscriber: &impl EventSubscriber) {
        subscriber.subscribe_all(SESSION_EVENT_TYPES, self.clone());
    }
}

#[async_trait]
impl EventHandler for SessionEventBridge {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let event_type = event.event_type.clone();
        let sequence = event.sequence;

        match self.channels.deliver(event).await {
            Delivery::Unroutable => {
                tracing::debug!(
                    event_type = %event_type,
                    "Cannot resolve session for event, skipping fan-out"
                );
            }
            Delivery::Duplicate => {
                tracing::debug!(event_type = %event_type, sequence, "Duplicate event ignored");
            }
            Delivery::Closed => {
                tracing::debug!(event_type = %event_type, sequence, "Session channel closed");
            }
            Delivery::Released | Delivery::ReleasedAfterGap { .. } => {}
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "SessionEventBridge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::domain::foundation::SessionId;
    use crate::ports::EventPublisher;
    use serde_json::json;

    fn envelope(event_type: &str, session_id: &SessionId, sequence: u64) -> EventEnvelope {
        EventEnvelope::new(
            event_type,
            session_id.to_string(),
            "LiveSession",
            sequence,
            json!({}),
        )
    }

    #[tokio::test]
    async fn published_events_reach_session_subscribers_in_order() {
        let bus = InMemoryEventBus::new();
        let channels = Arc::new(SessionChannels::new(16));
        let bridge = SessionEventBridge::new_shared(channels.clone());
        bridge.register(&bus);

        let session = SessionId::new();
        bus.publish(envelope("session.created.v1", &session, 1)).await.unwrap();
        let mut rx = channels.subscribe(&session).await.unwrap();

        bus.publish(envelope("session.started.v1", &session, 2)).await.unwrap();
        bus.publish(envelope("participant.joined.v1", &session, 3)).await.unwrap();

        let order: Vec<u64> = [rx.recv().await.unwrap(), rx.recv().await.unwrap()]
            .iter()
            .map(|e| e.sequence)
            .collect();
        assert_eq!(order, vec![2, 3]);
    }

    #[tokio::test]
    async fn events_after_a_failed_publish_still_flow() {
        let bus = InMemoryEventBus::new();
        let channels = Arc::new(SessionChannels::new(16));
        SessionEventBridge::new_shared(channels.clone()).register(&bus);

        let session = SessionId::new();
        bus.publish(envelope("session.created.v1", &session, 1)).await.unwrap();
        let mut rx = channels.subscribe(&session).await.unwrap();

        bus.set_failing(true);
        assert!(bus.publish(envelope("session.started.v1", &session, 2)).await.is_err());
        bus.set_failing(false);
        bus.publish(envelope("participant.joined.v1", &session, 3)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().sequence, 3);
        assert_eq!(channels.next_sequence(&session).await, Some(4));
    }

    #[tokio::test]
    async fn ended_session_releases_its_channel() {
        let bus = InMemoryEventBus::new();
        let channels = Arc::new(SessionChannels::new(16));
        SessionEventBridge::new_shared(channels.clone()).register(&bus);

        let session = SessionId::new();
        bus.publish(envelope("session.created.v1", &session, 1)).await.unwrap();
        bus.publish(envelope("session.ended.v1", &session, 2)).await.unwrap();

        assert!(channels.active_sessions().await.is_empty());
        assert!(channels.subscribe(&session).await.is_none());
    }

    #[tokio::test]
    async fn unknown_event_types_are_not_bridged() {
        let bus = InMemoryEventBus::new();
        let channels = Arc::new(SessionChannels::new(16));
        SessionEventBridge::new_shared(channels.clone()).register(&bus);

        let session = SessionId::new();
        bus.publish(envelope("unrelated.thing.v1", &session, 1)).await.unwrap();

        assert!(channels.active_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn unroutable_events_do_not_fail_publish() {
        let bus = InMemoryEventBus::new();
        let channels = Arc::new(SessionChannels::new(16));
        SessionEventBridge::new_shared(channels).register(&bus);

        let env = EventEnvelope::new("session.created.v1", "nope", "LiveSession", 1, json!({}));
        assert!(bus.publish(env).await.is_ok());
    }

    #[test]
    fn event_types_cover_every_family() {
        for family in ["session.", "participant.", "message.", "signal."] {
            assert!(SESSION_EVENT_TYPES.iter().any(|t| t.starts_with(family)));
        }
    }
}
