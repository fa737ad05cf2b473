//! CancelSessionHandler - Scheduled → Cancelled.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId};
use crate::domain::room::RoomError;
use crate::domain::session::{Session, SessionCancelled};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct CancelSessionCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct CancelSessionResult {
    pub session: Session,
    pub event: SessionCancelled,
}

pub struct CancelSessionHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl CancelSessionHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, actor = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: CancelSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<CancelSessionResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (session, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let applied = room.cancel_session(&actor, self.clock.now())?;
                let sequence = applied.sequence();
                let session = applied.into_value();
                let event = SessionCancelled {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    cancelled_by: actor.clone(),
                    cancelled_at: *session.updated_at(),
                };
                Ok(Staged::for_sequence(
                    (session, event.clone()),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        tracing::info!(session_id = %cmd.session_id, "session cancelled");
        Ok(CancelSessionResult { session, event })
    }
}
