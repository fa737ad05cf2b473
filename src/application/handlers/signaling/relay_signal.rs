//! RelaySignalHandler - Forward a WebRTC signaling blob to one peer.
//!
//! The payload is never stored; the room only checks that both ends are
//! present and reserves a sequence slot so the signal is ordered with the
//! rest of the session's events.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId, UserId};
use crate::domain::room::RoomError;
use crate::domain::signaling::{SignalKind, SignalPayload, SignalRelayed};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct RelaySignalCommand {
    pub session_id: SessionId,
    pub recipient_id: UserId,
    pub kind: SignalKind,
    pub payload: String,
}

pub struct RelaySignalHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl RelaySignalHandler {
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
    /// - `Validation` for an empty or oversized payload
    /// - `InvalidState` unless the session is Live
    /// - `Authorization` unless the sender is present
    /// - `InvalidOperation` when sender and recipient are the same
    /// - `ParticipantNotFound` if the recipient is not present
    #[tracing::instrument(
        skip(self, cmd, metadata),
        fields(session_id = %cmd.session_id, sender = %metadata.user_id, recipient = %cmd.recipient_id)
    )]
    pub async fn handle(
        &self,
        cmd: RelaySignalCommand,
        metadata: CommandMetadata,
    ) -> Result<SignalRelayed, RoomError> {
        let payload = SignalPayload::new(cmd.payload)?;
        let sender = metadata.user_id.clone();

        commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let relayed_at = room.not_before_latest(self.clock.now());
                let applied = room.relay_signal(&sender, &cmd.recipient_id)?;
                let event = SignalRelayed {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    sender_id: sender.clone(),
                    recipient_id: cmd.recipient_id.clone(),
                    kind: cmd.kind,
                    payload,
                    relayed_at,
                };
                Ok(Staged::for_sequence(
                    event.clone(),
                    &event,
                    applied.sequence(),
                    &metadata,
                ))
            },
        )
        .await
    }
}
