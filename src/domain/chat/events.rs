//! Chat events.

use serde::{Deserialize, Serialize};

use super::Message;
use crate::domain::foundation::{domain_event, EventId, MessageId, SessionId, Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════
// MessageSent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSent {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub sender_id: UserId,
    pub content: String,
    pub sent_at: Timestamp,
}

domain_event!(
    MessageSent,
    event_type = "message.sent.v1",
    aggregate_id = session_id,
    occurred_at = sent_at,
    event_id = event_id
);

impl MessageSent {
    pub fn from_message(message: &Message) -> Self {
        Self {
            event_id: EventId::new(),
            session_id: *message.session_id(),
            message_id: *message.id(),
            sender_id: message.sender_id().clone(),
            content: message.content().to_string(),
            sent_at: *message.created_at(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MessagePinnedStatusChanged
// ════════════════════════════════════════════════════════════════════════════

/// Published when a message is pinned or unpinned.
///
/// A pin that displaces an earlier pinned message reports it in
/// `unpinned_message_id`; both changes commit together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePinnedStatusChanged {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub is_pinned: bool,
    pub unpinned_message_id: Option<MessageId>,
    pub changed_by: UserId,
    pub changed_at: Timestamp,
}

domain_event!(
    MessagePinnedStatusChanged,
    event_type = "message.pinned_status_changed.v1",
    aggregate_id = session_id,
    occurred_at = changed_at,
    event_id = event_id
);
