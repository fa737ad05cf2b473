//! RemoveParticipantHandler - A manager kicks someone, optionally banning them.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId, UserId};
use crate::domain::participant::{Participant, ParticipantRemoved};
use crate::domain::room::RoomError;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct RemoveParticipantCommand {
    pub session_id: SessionId,
    pub target_user_id: UserId,
    /// Also refuse future joins from the target.
    pub ban: bool,
}

#[derive(Debug, Clone)]
pub struct RemoveParticipantResult {
    pub participant: Participant,
    pub event: ParticipantRemoved,
}

pub struct RemoveParticipantHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl RemoveParticipantHandler {
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

    #[tracing::instrument(
        skip(self, cmd, metadata),
        fields(session_id = %cmd.session_id, actor = %metadata.user_id, target = %cmd.target_user_id, ban = cmd.ban)
    )]
    pub async fn handle(
        &self,
        cmd: RemoveParticipantCommand,
        metadata: CommandMetadata,
    ) -> Result<RemoveParticipantResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let now = self.clock.now();
                let applied =
                    room.remove_participant(&actor, &cmd.target_user_id, cmd.ban, now)?;
                let sequence = applied.sequence();
                let participant = applied.into_value();
                let event = ParticipantRemoved {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    participant_id: *participant.id(),
                    user_id: cmd.target_user_id.clone(),
                    removed_by: actor.clone(),
                    banned: cmd.ban,
                    removed_at: participant.left_at().copied().unwrap_or(now),
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

        tracing::info!(session_id = %cmd.session_id, banned = cmd.ban, "participant removed");
        Ok(RemoveParticipantResult { participant, event })
    }
}
