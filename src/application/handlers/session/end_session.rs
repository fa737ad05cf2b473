//! EndSessionHandler - Live → Ended.
//!
//! Ending an already-ended session returns it unchanged and publishes
//! nothing, so two co-hosts racing to end both succeed.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId};
use crate::domain::room::{RoomError, SessionEnding};
use crate::domain::session::{Session, SessionEnded};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct EndSessionCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct EndSessionResult {
    pub session: Session,
    /// `None` when the session had already ended.
    pub event: Option<SessionEnded>,
}

pub struct EndSessionHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl EndSessionHandler {
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
        cmd: EndSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<EndSessionResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (session, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let now = self.clock.now();
                let applied = room.end_session(&actor, now)?;
                let Some(sequence) = applied.sequence() else {
                    return Ok(Staged::quiet((applied.into_value().session, None)));
                };

                let SessionEnding { session, released } = applied.into_value();
                let event = SessionEnded {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    ended_by: actor.clone(),
                    ended_at: session.ended_at().copied().unwrap_or(now),
                    duration_seconds: session.duration_seconds().unwrap_or(0),
                    participants_released: released,
                };
                Ok(Staged::with_event(
                    (session, Some(event.clone())),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        let Some(event) = event else {
            tracing::debug!(session_id = %cmd.session_id, "session already ended");
            return Ok(EndSessionResult {
                session,
                event: None,
            });
        };

        tracing::info!(
            session_id = %cmd.session_id,
            duration_seconds = event.duration_seconds,
            released = event.participants_released,
            "session ended"
        );
        Ok(EndSessionResult {
            session,
            event: Some(event),
        })
    }
}
