//! StartSessionHandler - Scheduled → Live.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId};
use crate::domain::room::RoomError;
use crate::domain::session::{Session, SessionStarted};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session: Session,
    pub event: SessionStarted,
}

pub struct StartSessionHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl StartSessionHandler {
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

    /// Starts the session regardless of its scheduled time.
    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, actor = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: StartSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<StartSessionResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (session, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let now = self.clock.now();
                let applied = room.start_session(&actor, now)?;
                let sequence = applied.sequence();
                let session = applied.into_value();
                let event = SessionStarted {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    started_by: actor.clone(),
                    started_at: session.started_at().copied().unwrap_or(now),
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

        tracing::info!(session_id = %cmd.session_id, "session started");
        Ok(StartSessionResult { session, event })
    }
}
