//! SetSelfMuteHandler - A participant toggles their own microphone.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, SessionId};
use crate::domain::participant::{MuteCause, MutedStatusChanged, Participant};
use crate::domain::room::RoomError;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct SetSelfMuteCommand {
    pub session_id: SessionId,
    pub muted: bool,
}

#[derive(Debug, Clone)]
pub struct SetSelfMuteResult {
    pub participant: Participant,
    pub event: MutedStatusChanged,
}

pub struct SetSelfMuteHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SetSelfMuteHandler {
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

    /// Unmuting while muted by the host fails with `Authorization`.
    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, user_id = %metadata.user_id, muted = cmd.muted))]
    pub async fn handle(
        &self,
        cmd: SetSelfMuteCommand,
        metadata: CommandMetadata,
    ) -> Result<SetSelfMuteResult, RoomError> {
        let user_id = metadata.user_id.clone();

        let cause = if cmd.muted {
            MuteCause::SelfMuted
        } else {
            MuteCause::SelfUnmuted
        };

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let changed_at = room.not_before_latest(self.clock.now());
                let applied = room.set_self_mute(&user_id, cmd.muted)?;
                let sequence = applied.sequence();
                let participant = applied.into_value();
                let event = MutedStatusChanged::from_participant(
                    &participant,
                    user_id.clone(),
                    cause,
                    changed_at,
                );
                Ok(Staged::for_sequence(
                    (participant, event.clone()),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        Ok(SetSelfMuteResult { participant, event })
    }
}
