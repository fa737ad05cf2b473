//! SetRecordingHandler - Toggle the recording flag before or during a session.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId};
use crate::domain::room::RoomError;
use crate::domain::session::{RecordingStatusChanged, Session};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct SetRecordingCommand {
    pub session_id: SessionId,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SetRecordingResult {
    pub session: Session,
    pub event: RecordingStatusChanged,
}

pub struct SetRecordingHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SetRecordingHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, actor = %metadata.user_id, enabled = cmd.enabled))]
    pub async fn handle(
        &self,
        cmd: SetRecordingCommand,
        metadata: CommandMetadata,
    ) -> Result<SetRecordingResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (session, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let applied = room.set_recording(&actor, cmd.enabled, self.clock.now())?;
                let sequence = applied.sequence();
                let session = applied.into_value();
                let event = RecordingStatusChanged {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    changed_by: actor.clone(),
                    recording_enabled: cmd.enabled,
                    changed_at: *session.updated_at(),
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

        Ok(SetRecordingResult { session, event })
    }
}
