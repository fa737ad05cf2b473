//! CreateSessionHandler - Command handler for creating new sessions.

use std::sync::Arc;

use crate::application::handlers::publishing::publish_unshared;
use crate::domain::foundation::{CommandMetadata, SessionId, Timestamp};
use crate::domain::room::{RoomError, SessionRoom, CREATED_SEQUENCE};
use crate::domain::session::{NewSession, Session, SessionCreated};
use crate::ports::{Clock, EventPublisher, SessionStore};

/// Command to create a new session. The acting user becomes the host.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionCommand {
    pub title: String,
    pub description: Option<String>,
    pub max_participants: Option<u32>,
    /// Omit to go live immediately.
    pub scheduled_at: Option<Timestamp>,
    pub recording_enabled: bool,
}

/// Result of successful session creation.
#[derive(Debug, Clone)]
pub struct CreateSessionResult {
    pub session: Session,
    pub event: SessionCreated,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl CreateSessionHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(host_id = %metadata.user_id))]
    pub async fn handle(
        &self,
        cmd: CreateSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateSessionResult, RoomError> {
        // 1. Build the aggregate
        let params = NewSession {
            title: cmd.title,
            description: cmd.description,
            max_participants: cmd.max_participants,
            scheduled_at: cmd.scheduled_at,
            recording_enabled: cmd.recording_enabled,
        };
        let session = Session::create(
            SessionId::new(),
            metadata.user_id.clone(),
            params,
            self.clock.now(),
        )?;

        // 2. Persist
        self.store.insert(SessionRoom::new(session.clone())).await?;

        // 3. Publish; the id is not handed out yet, so no lock is needed
        let event = SessionCreated::from_session(&session);
        publish_unshared(
            self.event_publisher.as_ref(),
            &event,
            CREATED_SEQUENCE,
            &metadata,
        )
        .await;

        tracing::info!(
            session_id = %session.id(),
            status = %session.status(),
            "session created"
        );
        Ok(CreateSessionResult { session, event })
    }
}
