//! Chat message entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, SessionId, Timestamp, UserId};
use crate::domain::room::RoomError;

/// Maximum message length, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// A chat message posted to a session.
///
/// Content is immutable once sent; only the pin flag changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    session_id: SessionId,
    sender_id: UserId,
    content: String,
    is_pinned: bool,
    created_at: Timestamp,
}

impl Message {
    /// Validates content and builds an unpinned message.
    ///
    /// # Errors
    ///
    /// - `Validation` if content is blank or longer than `MAX_MESSAGE_LENGTH`
    pub fn compose(
        session_id: SessionId,
        sender_id: UserId,
        content: String,
        now: Timestamp,
    ) -> Result<Self, RoomError> {
        Self::validate_content(&content)?;
        Ok(Self {
            id: MessageId::new(),
            session_id,
            sender_id,
            content,
            is_pinned: false,
            created_at: now,
        })
    }

    pub fn validate_content(content: &str) -> Result<(), RoomError> {
        if content.trim().is_empty() {
            return Err(RoomError::validation("content", "Message cannot be empty"));
        }
        let len = content.chars().count();
        if len > MAX_MESSAGE_LENGTH {
            return Err(RoomError::validation(
                "content",
                format!(
                    "Message is {} characters, limit is {}",
                    len, MAX_MESSAGE_LENGTH
                ),
            ));
        }
        Ok(())
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn sender_id(&self) -> &UserId {
        &self.sender_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub(crate) fn set_pinned(&mut self, pinned: bool) {
        self.is_pinned = pinned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(content: &str) -> Result<Message, RoomError> {
        Message::compose(
            SessionId::new(),
            UserId::new("alice").unwrap(),
            content.to_string(),
            Timestamp::now(),
        )
    }

    #[test]
    fn new_message_is_unpinned() {
        let message = compose("hello").unwrap();
        assert!(!message.is_pinned());
        assert_eq!(message.content(), "hello");
    }

    #[test]
    fn rejects_blank_content() {
        assert!(matches!(compose(""), Err(RoomError::Validation { .. })));
        assert!(matches!(compose("  \n"), Err(RoomError::Validation { .. })));
    }

    #[test]
    fn accepts_exactly_the_limit() {
        assert!(compose(&"a".repeat(MAX_MESSAGE_LENGTH)).is_ok());
        assert!(compose(&"a".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let emoji = "🎙".repeat(MAX_MESSAGE_LENGTH);
        assert!(compose(&emoji).is_ok());
    }
}
