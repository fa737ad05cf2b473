//! Shared wiring for integration tests.
//!
//! Builds every handler over one in-memory store, one event bus and a manual
//! clock, with the session fan-out bridge registered on the bus.

#![allow(dead_code)]

use std::sync::Arc;

use live_sessions::adapters::{
    InMemoryEventBus, InMemorySessionStore, ManualClock, SessionChannels, SessionEventBridge,
};
use live_sessions::application::*;
use live_sessions::domain::foundation::{CommandMetadata, SessionId, UserId};
use live_sessions::domain::participant::ParticipantRole;
use live_sessions::ports::{Clock, EventPublisher, SessionStore};

pub fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

pub fn as_user(name: &str) -> CommandMetadata {
    CommandMetadata::new(user(name)).with_correlation_id(format!("it-{name}"))
}

pub struct App {
    pub store: Arc<InMemorySessionStore>,
    pub bus: Arc<InMemoryEventBus>,
    pub clock: Arc<ManualClock>,
    pub channels: Arc<SessionChannels>,

    pub create: CreateSessionHandler,
    pub start: StartSessionHandler,
    pub end: EndSessionHandler,
    pub cancel: CancelSessionHandler,
    pub delete: DeleteSessionHandler,
    pub join: JoinSessionHandler,
    pub leave: LeaveSessionHandler,
    pub raise_hand: RaiseHandHandler,
    pub change_role: ChangeRoleHandler,
    pub mute: MuteParticipantHandler,
    pub send: SendMessageHandler,
    pub pin: PinMessageHandler,
    pub relay: RelaySignalHandler,
    pub get: GetSessionHandler,
    pub list_messages: ListMessagesHandler,
}

impl App {
    pub fn new() -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(ManualClock::default());
        let channels = Arc::new(SessionChannels::new(256));
        SessionEventBridge::new_shared(channels.clone()).register(bus.as_ref());

        let s: Arc<dyn SessionStore> = store.clone();
        let p: Arc<dyn EventPublisher> = bus.clone();
        let c: Arc<dyn Clock> = clock.clone();

        Self {
            create: CreateSessionHandler::new(s.clone(), p.clone(), c.clone()),
            start: StartSessionHandler::new(s.clone(), p.clone(), c.clone()),
            end: EndSessionHandler::new(s.clone(), p.clone(), c.clone()),
            cancel: CancelSessionHandler::new(s.clone(), p.clone(), c.clone()),
            delete: DeleteSessionHandler::new(s.clone(), p.clone(), c.clone()),
            join: JoinSessionHandler::new(s.clone(), p.clone(), c.clone()),
            leave: LeaveSessionHandler::new(s.clone(), p.clone(), c.clone()),
            raise_hand: RaiseHandHandler::new(s.clone(), p.clone(), c.clone()),
            change_role: ChangeRoleHandler::new(s.clone(), p.clone(), c.clone()),
            mute: MuteParticipantHandler::new(s.clone(), p.clone(), c.clone()),
            send: SendMessageHandler::new(s.clone(), p.clone(), c.clone()),
            pin: PinMessageHandler::new(s.clone(), p.clone(), c.clone()),
            relay: RelaySignalHandler::new(s.clone(), p.clone(), c.clone()),
            get: GetSessionHandler::new(s.clone()),
            list_messages: ListMessagesHandler::new(s),
            store,
            bus,
            clock,
            channels,
        }
    }

    /// Live session hosted by `host`.
    pub async fn live_session(&self, max_participants: Option<u32>) -> SessionId {
        let cmd = CreateSessionCommand {
            title: "Friday AMA".to_string(),
            max_participants,
            ..Default::default()
        };
        let result = self.create.handle(cmd, as_user("host")).await.unwrap();
        *result.session.id()
    }

    pub async fn scheduled_session(&self, minutes_ahead: i64) -> SessionId {
        let cmd = CreateSessionCommand {
            title: "Planned talk".to_string(),
            scheduled_at: Some(self.clock.now().plus_minutes(minutes_ahead)),
            ..Default::default()
        };
        let result = self.create.handle(cmd, as_user("host")).await.unwrap();
        *result.session.id()
    }

    pub async fn join_listener(&self, session_id: SessionId, name: &str) {
        self.join
            .handle(JoinSessionCommand::listener(session_id), as_user(name))
            .await
            .unwrap();
    }

    pub async fn promote(&self, session_id: SessionId, name: &str, role: ParticipantRole) {
        self.change_role
            .handle(
                ChangeRoleCommand {
                    session_id,
                    target_user_id: user(name),
                    new_role: role,
                },
                as_user("host"),
            )
            .await
            .unwrap();
    }

    pub fn event_types(&self) -> Vec<String> {
        self.bus
            .published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }
}
