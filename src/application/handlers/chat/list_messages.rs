//! ListMessagesHandler - Chat history for a session member.

use std::sync::Arc;

use crate::domain::chat::Message;
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::policy;
use crate::domain::room::RoomError;
use crate::ports::SessionStore;

#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub session_id: SessionId,
    pub user_id: UserId,
}

pub struct ListMessagesHandler {
    store: Arc<dyn SessionStore>,
}

impl ListMessagesHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Messages in the order they were sent.
    pub async fn handle(&self, query: ListMessagesQuery) -> Result<Vec<Message>, RoomError> {
        let room = self
            .store
            .load(&query.session_id)
            .await?
            .ok_or(RoomError::SessionNotFound(query.session_id))?;

        if !policy::can_subscribe(&query.user_id, &room) {
            return Err(policy::deny(
                &room,
                &query.user_id,
                "list_messages",
                "not a member of this session",
            ));
        }

        Ok(room.messages().to_vec())
    }
}
