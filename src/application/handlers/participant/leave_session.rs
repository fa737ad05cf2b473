//! LeaveSessionHandler - A participant exits a session.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId};
use crate::domain::participant::{Participant, ParticipantLeft};
use crate::domain::room::RoomError;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct LeaveSessionCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct LeaveSessionResult {
    pub participant: Participant,
    pub event: ParticipantLeft,
}

pub struct LeaveSessionHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl LeaveSessionHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, user_id = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: LeaveSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<LeaveSessionResult, RoomError> {
        let user_id = metadata.user_id.clone();

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let now = self.clock.now();
                let applied = room.leave(&user_id, now)?;
                let sequence = applied.sequence();
                let participant = applied.into_value();
                let event = ParticipantLeft {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    participant_id: *participant.id(),
                    user_id: user_id.clone(),
                    left_at: participant.left_at().copied().unwrap_or(now),
                };
                Ok(Staged::for_sequence(
                    (participant, event.clone()),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        Ok(LeaveSessionResult { participant, event })
    }
}
