//! Commit-then-publish shared by every command handler.
//!
//! A handler's mutation runs under the session lock and stages the envelope
//! for the event it produced. The envelope is published before the lock is
//! released, so a session's events reach the bus in commit order. A publish
//! failure never undoes the commit; it is logged and the command still
//! succeeds.

use futures::FutureExt;

use crate::domain::foundation::{
    CommandMetadata, EventEnvelope, SerializableDomainEvent, SessionId,
};
use crate::domain::room::{RoomError, SessionRoom};
use crate::ports::{EventPublisher, SessionStore};

/// A mutation's result plus the envelope to publish for it, if any.
pub(crate) struct Staged<T> {
    value: T,
    envelope: Option<EventEnvelope>,
}

impl<T> Staged<T> {
    /// Nothing changed; nothing to publish.
    pub(crate) fn quiet(value: T) -> Self {
        Self {
            value,
            envelope: None,
        }
    }

    /// Stamp `event` with its commit sequence and request context.
    ///
    /// An event that cannot be encoded is logged and dropped; the commit
    /// stands and subscribers see a gap at `sequence`.
    pub(crate) fn with_event<E>(
        value: T,
        event: &E,
        sequence: u64,
        metadata: &CommandMetadata,
    ) -> Self
    where
        E: SerializableDomainEvent,
    {
        let envelope = match event.to_envelope(sequence) {
            Ok(envelope) => Some(stamp(envelope, metadata)),
            Err(e) => {
                tracing::warn!(
                    event_type = event.event_type(),
                    sequence,
                    error = %e,
                    "failed to encode committed event"
                );
                None
            }
        };
        Self { value, envelope }
    }

    /// Like [`with_event`](Self::with_event) when a sequence was allotted,
    /// [`quiet`](Self::quiet) otherwise.
    pub(crate) fn for_sequence<E>(
        value: T,
        event: &E,
        sequence: Option<u64>,
        metadata: &CommandMetadata,
    ) -> Self
    where
        E: SerializableDomainEvent,
    {
        match sequence {
            Some(sequence) => Self::with_event(value, event, sequence, metadata),
            None => Self::quiet(value),
        }
    }
}

/// Run `mutate` under the session lock and publish what it staged before the
/// lock is released.
pub(crate) async fn commit_and_publish<T, F>(
    store: &dyn SessionStore,
    publisher: &dyn EventPublisher,
    session_id: &SessionId,
    mutate: F,
) -> Result<T, RoomError>
where
    T: Send,
    F: FnOnce(&mut SessionRoom) -> Result<Staged<T>, RoomError> + Send,
{
    let mut output = None;
    store
        .with_session_lock(
            session_id,
            Box::new(|room: &mut SessionRoom| {
                let Staged { value, envelope } = mutate(room)?;
                output = Some(value);
                Ok(publish_staged(publisher, envelope).boxed())
            }),
        )
        .await?;
    output.ok_or_else(|| RoomError::infrastructure("session lock returned without running"))
}

/// Publish the event of a room no other caller can reach yet.
pub(crate) async fn publish_unshared<E>(
    publisher: &dyn EventPublisher,
    event: &E,
    sequence: u64,
    metadata: &CommandMetadata,
) where
    E: SerializableDomainEvent,
{
    let Staged { envelope, .. } = Staged::with_event((), event, sequence, metadata);
    publish_staged(publisher, envelope).await;
}

/// Publish one staged envelope, logging instead of failing.
pub(crate) async fn publish_staged(publisher: &dyn EventPublisher, envelope: Option<EventEnvelope>) {
    let Some(envelope) = envelope else {
        return;
    };

    let event_type = envelope.event_type.clone();
    let session_id = envelope.aggregate_id.clone();
    let sequence = envelope.sequence;
    match publisher.publish(envelope).await {
        Ok(()) => tracing::debug!(
            session_id = %session_id,
            event_type = %event_type,
            sequence,
            "event published"
        ),
        Err(e) => tracing::warn!(
            session_id = %session_id,
            event_type = %event_type,
            sequence,
            error = %e,
            "event publish failed after commit"
        ),
    }
}

fn stamp(envelope: EventEnvelope, metadata: &CommandMetadata) -> EventEnvelope {
    let envelope = envelope
        .with_correlation_id(metadata.correlation_id())
        .with_user_id(metadata.user_id.to_string());
    match metadata.trace_id() {
        Some(trace_id) => envelope.with_trace_id(trace_id),
        None => envelope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryEventBus, InMemorySessionStore};
    use crate::domain::foundation::{EventId, Timestamp, UserId};
    use crate::domain::session::{NewSession, Session, SessionStarted};

    fn started(session_id: SessionId) -> SessionStarted {
        SessionStarted {
            event_id: EventId::new(),
            session_id,
            started_by: UserId::new("host").unwrap(),
            started_at: Timestamp::now(),
        }
    }

    fn metadata() -> CommandMetadata {
        CommandMetadata::new(UserId::new("host").unwrap())
            .with_correlation_id("corr-1")
            .with_trace_id("trace-1")
    }

    async fn stored_room(store: &InMemorySessionStore, new: NewSession) -> SessionId {
        let id = SessionId::new();
        let session =
            Session::create(id, UserId::new("host").unwrap(), new, Timestamp::now()).unwrap();
        store.insert(SessionRoom::new(session)).await.unwrap();
        id
    }

    #[tokio::test]
    async fn stamps_sequence_and_context() {
        let bus = InMemoryEventBus::new();
        let staged = Staged::with_event((), &started(SessionId::new()), 4, &metadata());
        publish_staged(&bus, staged.envelope).await;

        let events = bus.published_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence, 4);
        assert_eq!(events[0].metadata.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(events[0].metadata.user_id.as_deref(), Some("host"));
        assert_eq!(events[0].metadata.trace_id.as_deref(), Some("trace-1"));
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        let bus = InMemoryEventBus::new();
        bus.set_failing(true);

        let staged = Staged::with_event((), &started(SessionId::new()), 2, &metadata());
        publish_staged(&bus, staged.envelope).await;

        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn quiet_mutation_publishes_nothing() {
        let store = InMemorySessionStore::new();
        let bus = InMemoryEventBus::new();
        let id = stored_room(&store, NewSession::titled("Talk")).await;

        let value = commit_and_publish(&store, &bus, &id, |room| {
            Ok(Staged::quiet(room.last_sequence()))
        })
        .await
        .unwrap();

        assert_eq!(value, 1);
        assert_eq!(bus.event_count(), 0);
    }

    #[tokio::test]
    async fn staged_event_is_published_with_the_commit() {
        let store = InMemorySessionStore::new();
        let bus = InMemoryEventBus::new();
        let later = NewSession::titled("Later").scheduled_for(Timestamp::now().plus_minutes(30));
        let id = stored_room(&store, later).await;
        let metadata = metadata();

        commit_and_publish(&store, &bus, &id, |room| {
            let applied = room.start_session(&UserId::new("host").unwrap(), Timestamp::now())?;
            Ok(Staged::for_sequence((), &started(id), applied.sequence(), &metadata))
        })
        .await
        .unwrap();

        assert_eq!(bus.events_for_session(&id).len(), 1);
        assert_eq!(bus.published_events()[0].sequence, 2);
    }

    #[tokio::test]
    async fn rejected_mutation_publishes_nothing() {
        let store = InMemorySessionStore::new();
        let bus = InMemoryEventBus::new();
        let id = stored_room(&store, NewSession::titled("Live")).await;

        let err = commit_and_publish(&store, &bus, &id, |room| {
            let applied = room.start_session(&UserId::new("host").unwrap(), Timestamp::now())?;
            Ok(Staged::for_sequence((), &started(id), applied.sequence(), &metadata()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, RoomError::InvalidState(_)));
        assert_eq!(bus.event_count(), 0);
    }
}
