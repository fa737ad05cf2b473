//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::adapters::{InMemoryEventBus, InMemorySessionStore, ManualClock};
use crate::domain::foundation::{CommandMetadata, EventEnvelope, SessionId, Timestamp, UserId};
use crate::domain::participant::ParticipantRole;
use crate::domain::room::SessionRoom;
use crate::domain::session::{NewSession, Session};
use crate::ports::{with_room, Clock, EventPublisher, SessionStore};

pub(crate) fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

pub(crate) fn host() -> UserId {
    user("host")
}

pub(crate) fn as_user(name: &str) -> CommandMetadata {
    CommandMetadata::new(user(name)).with_correlation_id("test-correlation")
}

/// In-memory store, bus and manual clock wired together.
pub(crate) struct Harness {
    pub store: Arc<InMemorySessionStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemorySessionStore::new()),
            bus: Arc::new(InMemoryEventBus::new()),
            clock: Arc::new(ManualClock::default()),
        }
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    pub fn publisher(&self) -> Arc<dyn EventPublisher> {
        self.bus.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    async fn seed(&self, params: NewSession) -> SessionId {
        let session = Session::create(SessionId::new(), host(), params, self.now()).unwrap();
        let id = *session.id();
        self.store.insert(SessionRoom::new(session)).await.unwrap();
        id
    }

    /// Live session hosted by `host`, no capacity limit.
    pub async fn live_session(&self) -> SessionId {
        self.seed(NewSession::titled("Live room")).await
    }

    pub async fn capped_session(&self, max: u32) -> SessionId {
        self.seed(NewSession::titled("Small room").with_capacity(max))
            .await
    }

    /// Scheduled one hour ahead.
    pub async fn scheduled_session(&self) -> SessionId {
        let at = self.now().plus_minutes(60);
        self.seed(NewSession::titled("Later").scheduled_for(at)).await
    }

    /// Admits `name` as a listener without publishing.
    pub async fn join(&self, id: &SessionId, name: &str) {
        let who = user(name);
        let now = self.now();
        with_room(self.store.as_ref(), id, |room| {
            room.join(&who, ParticipantRole::Listener, now)
        })
        .await
        .unwrap();
    }

    /// Joins `name` and has the host give them `role`.
    pub async fn join_as(&self, id: &SessionId, name: &str, role: ParticipantRole) {
        self.join(id, name).await;
        let who = user(name);
        with_room(self.store.as_ref(), id, |room| {
            room.change_role(&host(), &who, role)
        })
        .await
        .unwrap();
    }

    pub async fn room(&self, id: &SessionId) -> SessionRoom {
        self.store.load(id).await.unwrap().unwrap()
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.bus.published_events()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.event_type).collect()
    }
}
