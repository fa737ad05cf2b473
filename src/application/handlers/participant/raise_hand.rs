//! RaiseHandHandler - A listener asks to speak.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId};
use crate::domain::participant::{HandRaised, Participant};
use crate::domain::room::RoomError;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct RaiseHandCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct RaiseHandResult {
    pub participant: Participant,
    pub event: HandRaised,
}

pub struct RaiseHandHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl RaiseHandHandler {
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
        cmd: RaiseHandCommand,
        metadata: CommandMetadata,
    ) -> Result<RaiseHandResult, RoomError> {
        let user_id = metadata.user_id.clone();

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let raised_at = room.not_before_latest(self.clock.now());
                let applied = room.raise_hand(&user_id)?;
                let sequence = applied.sequence();
                let participant = applied.into_value();
                let event = HandRaised {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    participant_id: *participant.id(),
                    user_id: user_id.clone(),
                    raised_at,
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

        Ok(RaiseHandResult { participant, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{as_user, Harness};
    use crate::domain::participant::ParticipantRole;

    fn handler(h: &Harness) -> RaiseHandHandler {
        RaiseHandHandler::new(h.store(), h.publisher(), h.clock())
    }

    fn raise(id: SessionId) -> RaiseHandCommand {
        RaiseHandCommand { session_id: id }
    }

    #[tokio::test]
    async fn listener_raises_hand() {
        let h = Harness::new();
        let id = h.live_session().await;
        h.join(&id, "alice").await;

        let result = handler(&h).handle(raise(id), as_user("alice")).await.unwrap();

        assert!(result.participant.hand_raised());
        assert_eq!(h.event_types(), vec!["participant.hand_raised.v1"]);
    }

    #[tokio::test]
    async fn raised_at_never_precedes_the_join() {
        let h = Harness::new();
        let id = h.live_session().await;
        let start = h.now();
        h.clock.advance_secs(20);
        h.join(&id, "alice").await;
        h.clock.set(start.plus_secs(3));

        let result = handler(&h).handle(raise(id), as_user("alice")).await.unwrap();

        assert_eq!(result.event.raised_at, start.plus_secs(20));
        assert_eq!(result.participant.joined_at(), &result.event.raised_at);
    }

    #[tokio::test]
    async fn raising_twice_conflicts() {
        let h = Harness::new();
        let id = h.live_session().await;
        h.join(&id, "alice").await;
        handler(&h).handle(raise(id), as_user("alice")).await.unwrap();

        let result = handler(&h).handle(raise(id), as_user("alice")).await;

        assert!(matches!(result, Err(RoomError::Conflict(_))));
        assert_eq!(h.events().len(), 1);
    }

    #[tokio::test]
    async fn speaker_cannot_raise_hand() {
        let h = Harness::new();
        let id = h.live_session().await;
        h.join_as(&id, "alice", ParticipantRole::Speaker).await;

        let result = handler(&h).handle(raise(id), as_user("alice")).await;

        assert!(matches!(result, Err(RoomError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn non_member_is_not_found() {
        let h = Harness::new();
        let id = h.live_session().await;

        let result = handler(&h).handle(raise(id), as_user("alice")).await;

        assert!(matches!(result, Err(RoomError::ParticipantNotFound(_))));
    }
}
