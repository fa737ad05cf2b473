//! LowerHandHandler - Withdraw a raised hand, by its owner or a manager.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId, UserId};
use crate::domain::participant::{HandLowered, Participant};
use crate::domain::room::RoomError;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct LowerHandCommand {
    pub session_id: SessionId,
    /// Whose hand; the actor's own or, for managers, anyone's.
    pub target_user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct LowerHandResult {
    pub participant: Participant,
    pub event: HandLowered,
}

pub struct LowerHandHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl LowerHandHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, actor = %metadata.user_id, target = %cmd.target_user_id))]
    pub async fn handle(
        &self,
        cmd: LowerHandCommand,
        metadata: CommandMetadata,
    ) -> Result<LowerHandResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let lowered_at = room.not_before_latest(self.clock.now());
                let applied = room.lower_hand(&actor, &cmd.target_user_id)?;
                let sequence = applied.sequence();
                let participant = applied.into_value();
                let event = HandLowered {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    participant_id: *participant.id(),
                    user_id: cmd.target_user_id.clone(),
                    lowered_by: actor.clone(),
                    lowered_at,
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

        Ok(LowerHandResult { participant, event })
    }
}
