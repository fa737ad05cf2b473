//! Session entity.
//!
//! A live session is a scheduled or ongoing audio room owned by exactly one
//! host. The entity only knows about its own lifecycle; membership, chat and
//! sequencing live on the enclosing [`SessionRoom`](crate::domain::room::SessionRoom).

use serde::{Deserialize, Serialize};

use super::SessionStatus;
use crate::domain::foundation::{SessionId, StateMachine, Timestamp, UserId};
use crate::domain::room::RoomError;

/// Maximum length for session title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for session description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Caller-supplied fields for a new session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub title: String,
    pub description: Option<String>,
    pub max_participants: Option<u32>,
    pub scheduled_at: Option<Timestamp>,
    pub recording_enabled: bool,
}

impl NewSession {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, max_participants: u32) -> Self {
        self.max_participants = Some(max_participants);
        self
    }

    pub fn scheduled_for(mut self, at: Timestamp) -> Self {
        self.scheduled_at = Some(at);
        self
    }
}

/// Live session entity.
///
/// # Invariants
///
/// - `host_id` never changes
/// - `started_at` is set iff status has reached Live
/// - `ended_at` and `duration_seconds` are set iff status is Ended
/// - `duration_seconds == ended_at - started_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    host_id: UserId,
    title: String,
    description: Option<String>,
    status: SessionStatus,
    /// `None` means unlimited.
    max_participants: Option<u32>,
    scheduled_at: Option<Timestamp>,
    started_at: Option<Timestamp>,
    ended_at: Option<Timestamp>,
    duration_seconds: Option<i64>,
    recording_enabled: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Create a new session.
    ///
    /// With `scheduled_at` the session starts out `Scheduled`; without it the
    /// session goes straight to `Live` with `started_at = now`.
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank or too long, the description is too
    ///   long, `max_participants` is zero, or `scheduled_at` is not in the future
    pub fn create(
        id: SessionId,
        host_id: UserId,
        params: NewSession,
        now: Timestamp,
    ) -> Result<Self, RoomError> {
        Self::validate_title(&params.title)?;
        if let Some(description) = &params.description {
            Self::validate_description(description)?;
        }
        if params.max_participants == Some(0) {
            return Err(RoomError::validation(
                "max_participants",
                "max_participants must be at least 1",
            ));
        }
        if let Some(at) = &params.scheduled_at {
            if !at.is_after(&now) {
                return Err(RoomError::validation(
                    "scheduled_at",
                    "scheduled_at must be in the future",
                ));
            }
        }

        let (status, started_at) = match params.scheduled_at {
            Some(_) => (SessionStatus::Scheduled, None),
            None => (SessionStatus::Live, Some(now)),
        };

        Ok(Self {
            id,
            host_id,
            title: params.title.trim().to_string(),
            description: params.description,
            status,
            max_participants: params.max_participants,
            scheduled_at: params.scheduled_at,
            started_at,
            ended_at: None,
            duration_seconds: None,
            recording_enabled: params.recording_enabled,
            created_at: now,
            updated_at: now,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn host_id(&self) -> &UserId {
        &self.host_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn max_participants(&self) -> Option<u32> {
        self.max_participants
    }

    pub fn scheduled_at(&self) -> Option<&Timestamp> {
        self.scheduled_at.as_ref()
    }

    pub fn started_at(&self) -> Option<&Timestamp> {
        self.started_at.as_ref()
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    /// Whole seconds between start and end. Only set once Ended.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.duration_seconds
    }

    pub fn recording_enabled(&self) -> bool {
        self.recording_enabled
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_host(&self, user_id: &UserId) -> bool {
        &self.host_id == user_id
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Scheduled → Live.
    pub(crate) fn start(&mut self, now: Timestamp) -> Result<(), RoomError> {
        self.transition(SessionStatus::Live)?;
        self.started_at = Some(now);
        self.ended_at = None;
        self.duration_seconds = None;
        self.updated_at = now;
        Ok(())
    }

    /// Live → Ended. Returns `false` when the session had already ended.
    pub(crate) fn end(&mut self, now: Timestamp) -> Result<bool, RoomError> {
        if self.status == SessionStatus::Ended {
            return Ok(false);
        }
        if !self.status.can_transition_to(&SessionStatus::Ended) {
            return Err(RoomError::invalid_state(format!(
                "cannot end a {} session",
                self.status
            )));
        }
        let started_at = self.started_at.ok_or_else(|| {
            RoomError::invalid_state("live session has no start time recorded")
        })?;
        self.status = SessionStatus::Ended;
        // Clock skew must not yield a negative duration.
        let ended_at = if now.is_before(&started_at) {
            started_at
        } else {
            now
        };
        self.ended_at = Some(ended_at);
        self.duration_seconds = Some(ended_at.seconds_since(&started_at));
        self.updated_at = ended_at;
        Ok(true)
    }

    /// Scheduled → Cancelled.
    pub(crate) fn cancel(&mut self, now: Timestamp) -> Result<(), RoomError> {
        self.transition(SessionStatus::Cancelled)?;
        self.updated_at = now;
        Ok(())
    }

    pub(crate) fn set_recording(&mut self, enabled: bool, now: Timestamp) -> Result<(), RoomError> {
        if self.status.is_terminal() {
            return Err(RoomError::invalid_state(format!(
                "cannot change recording on a {} session",
                self.status
            )));
        }
        if self.recording_enabled == enabled {
            return Err(RoomError::conflict(format!(
                "recording is already {}",
                if enabled { "enabled" } else { "disabled" }
            )));
        }
        self.recording_enabled = enabled;
        self.updated_at = now;
        Ok(())
    }

    /// Fails unless the session is Live.
    pub fn ensure_live(&self) -> Result<(), RoomError> {
        if self.is_live() {
            Ok(())
        } else {
            Err(RoomError::invalid_state(format!(
                "session is {}, not live",
                self.status
            )))
        }
    }

    /// Deletion is refused while the session is on air.
    pub fn ensure_deletable(&self) -> Result<(), RoomError> {
        if self.is_live() {
            Err(RoomError::invalid_state(
                "a live session must be ended before it is deleted",
            ))
        } else {
            Ok(())
        }
    }

    fn transition(&mut self, target: SessionStatus) -> Result<(), RoomError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| RoomError::invalid_state(e.to_string()))?;
        Ok(())
    }

    fn validate_title(title: &str) -> Result<(), RoomError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(RoomError::validation("title", "Title cannot be empty"));
        }
        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(RoomError::validation(
                "title",
                format!("Title cannot exceed {} characters", MAX_TITLE_LENGTH),
            ));
        }
        Ok(())
    }

    fn validate_description(description: &str) -> Result<(), RoomError> {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(RoomError::validation(
                "description",
                format!(
                    "Description cannot exceed {} characters",
                    MAX_DESCRIPTION_LENGTH
                ),
            ));
        }
        Ok(())
    }
}
