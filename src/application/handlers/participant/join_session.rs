//! JoinSessionHandler - Admit a user into a live session.
//!
//! Capacity is checked and the row inserted under the same session lock, so
//! concurrent joins can never overshoot `max_participants`.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, SessionId};
use crate::domain::participant::{Participant, ParticipantJoined, ParticipantRole};
use crate::domain::room::{Admission, RoomError};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct JoinSessionCommand {
    pub session_id: SessionId,
    /// Only `Listener` is accepted; other roles are granted by a manager.
    pub role: ParticipantRole,
}

impl JoinSessionCommand {
    pub fn listener(session_id: SessionId) -> Self {
        Self {
            session_id,
            role: ParticipantRole::Listener,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinSessionResult {
    pub participant: Participant,
    /// `None` when the user was already in the session.
    pub event: Option<ParticipantJoined>,
}

pub struct JoinSessionHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl JoinSessionHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            event_publisher,
            clock,
        }
    }

    /// # Errors
    ///
    /// - `InvalidState` unless the session is Live
    /// - `InvalidOperation` for the host
    /// - `Authorization` for a non-listener role or a banned user
    /// - `CapacityExceeded` when the session is full
    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, user_id = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: JoinSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<JoinSessionResult, RoomError> {
        let user_id = metadata.user_id.clone();

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let applied = room.join(&user_id, cmd.role, self.clock.now())?;
                let sequence = applied.sequence();
                let Admission {
                    participant,
                    active_count,
                } = applied.into_value();

                let Some(sequence) = sequence else {
                    return Ok(Staged::quiet((participant, None)));
                };
                let event = ParticipantJoined::from_participant(&participant, active_count);
                Ok(Staged::with_event(
                    (participant, Some(event.clone())),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        match &event {
            Some(event) => tracing::debug!(
                session_id = %cmd.session_id,
                active_count = event.active_count,
                "participant joined"
            ),
            None => tracing::debug!(session_id = %cmd.session_id, "already joined"),
        }
        Ok(JoinSessionResult { participant, event })
    }
}
