//! DeleteSessionHandler - Host removes a session that is not on air.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId};
use crate::domain::room::RoomError;
use crate::domain::session::SessionDeleted;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub session_id: SessionId,
}

pub struct DeleteSessionHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl DeleteSessionHandler {
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
    /// - `Authorization` unless the actor is the host
    /// - `InvalidState` while the session is Live
    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, actor = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: DeleteSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<SessionDeleted, RoomError> {
        let actor = metadata.user_id.clone();

        let event = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let deleted_at = room.not_before_latest(self.clock.now());
                let applied = room.delete_session(&actor)?;
                let sequence = applied.sequence();
                let event = SessionDeleted {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    deleted_by: actor.clone(),
                    final_status: applied.value().status(),
                    deleted_at,
                };
                Ok(Staged::for_sequence(event.clone(), &event, sequence, &metadata))
            },
        )
        .await?;

        tracing::info!(session_id = %cmd.session_id, final_status = %event.final_status, "session deleted");
        Ok(event)
    }
}
