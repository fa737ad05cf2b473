//! PinMessageHandler - Pin or unpin a chat message.
//!
//! Pinning displaces any other pinned message in the same commit, so a
//! session never shows more than one pin.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::chat::{Message, MessagePinnedStatusChanged};
use crate::domain::foundation::{CommandMetadata, EventId, MessageId, SessionId};
use crate::domain::room::{PinUpdate, RoomError};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct PinMessageCommand {
    pub session_id: SessionId,
    pub message_id: MessageId,
    /// `true` pins, `false` unpins.
    pub pin: bool,
}

#[derive(Debug, Clone)]
pub struct PinMessageResult {
    pub message: Message,
    /// `None` when the message was already in the requested state.
    pub event: Option<MessagePinnedStatusChanged>,
}

pub struct PinMessageHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl PinMessageHandler {
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
        fields(session_id = %cmd.session_id, actor = %metadata.user_id, message_id = %cmd.message_id, pin = cmd.pin)
    )]
    pub async fn handle(
        &self,
        cmd: PinMessageCommand,
        metadata: CommandMetadata,
    ) -> Result<PinMessageResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (message, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let changed_at = room.not_before_latest(self.clock.now());
                let applied = room.set_pinned(&actor, &cmd.message_id, cmd.pin)?;
                let sequence = applied.sequence();
                let PinUpdate { message, unpinned } = applied.into_value();
                let Some(sequence) = sequence else {
                    return Ok(Staged::quiet((message, None)));
                };

                let event = MessagePinnedStatusChanged {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    message_id: cmd.message_id,
                    is_pinned: message.is_pinned(),
                    unpinned_message_id: unpinned,
                    changed_by: actor.clone(),
                    changed_at,
                };
                Ok(Staged::with_event(
                    (message, Some(event.clone())),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        Ok(PinMessageResult { message, event })
    }
}
