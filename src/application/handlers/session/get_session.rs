//! Session read side: current state and subscription checks.
//!
//! Both queries read a snapshot; neither takes the session lock.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::chat::Message;
use crate::domain::foundation::{SessionId, UserId};
use crate::domain::participant::Participant;
use crate::domain::policy;
use crate::domain::room::{RoomError, SessionRoom};
use crate::domain::session::Session;
use crate::ports::SessionStore;

/// Current state of a session as seen by a subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session: Session,
    pub active_participants: Vec<Participant>,
    pub pinned_message: Option<Message>,
    /// Sequence of the last committed event; clients resume streams after it.
    pub last_sequence: u64,
}

impl SessionView {
    fn of(room: &SessionRoom) -> Self {
        Self {
            session: room.session().clone(),
            active_participants: room.active_participants().cloned().collect(),
            pinned_message: room.pinned_message().cloned(),
            last_sequence: room.last_sequence(),
        }
    }
}

/// Query to get a session by ID.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// Handler for retrieving session details.
pub struct GetSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Visible to the host and active participants only.
    pub async fn handle(&self, query: GetSessionQuery) -> Result<SessionView, RoomError> {
        let room = self
            .store
            .load(&query.session_id)
            .await?
            .ok_or(RoomError::SessionNotFound(query.session_id))?;

        if !policy::can_subscribe(&query.user_id, &room) {
            return Err(policy::deny(
                &room,
                &query.user_id,
                "get_session",
                "not a member of this session",
            ));
        }

        Ok(SessionView::of(&room))
    }
}

/// Query deciding whether a user may open the session's event stream.
#[derive(Debug, Clone)]
pub struct AuthorizeSubscriptionQuery {
    pub session_id: SessionId,
    pub user_id: UserId,
}

pub struct AuthorizeSubscriptionHandler {
    store: Arc<dyn SessionStore>,
}

impl AuthorizeSubscriptionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// `false` for unknown or deleted sessions.
    pub async fn handle(&self, query: AuthorizeSubscriptionQuery) -> Result<bool, RoomError> {
        let Some(room) = self.store.load(&query.session_id).await? else {
            return Ok(false);
        };
        let allowed = policy::can_subscribe(&query.user_id, &room);
        tracing::debug!(
            session_id = %query.session_id,
            user_id = %query.user_id,
            allowed,
            "subscription check"
        );
        Ok(allowed)
    }
}
