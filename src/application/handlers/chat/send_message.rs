//! SendMessageHandler - Post a chat message to a live session.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::chat::{Message, MessageSent};
use crate::domain::foundation::{CommandMetadata, SessionId};
use crate::domain::room::RoomError;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub session_id: SessionId,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub message: Message,
    pub event: MessageSent,
}

pub struct SendMessageHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageHandler {
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
    /// - `Validation` for blank content or more than 1000 characters
    /// - `InvalidState` unless the session is Live
    /// - `Authorization` unless the sender is the host or an active participant
    #[tracing::instrument(skip(self, cmd, metadata), fields(session_id = %cmd.session_id, sender = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: SendMessageCommand,
        metadata: CommandMetadata,
    ) -> Result<SendMessageResult, RoomError> {
        let sender = metadata.user_id.clone();
        let content = cmd.content;

        let (message, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let applied = room.send_message(&sender, content, self.clock.now())?;
                let sequence = applied.sequence();
                let message = applied.into_value();
                let event = MessageSent::from_message(&message);
                Ok(Staged::for_sequence(
                    (message, event.clone()),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        Ok(SendMessageResult { message, event })
    }
}
