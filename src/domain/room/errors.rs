//! Room-level error taxonomy.
//!
//! Every inbound command fails with one of these variants. `Authorization`
//! means the actor may never do this; `InvalidState`, `Conflict` and
//! `CapacityExceeded` mean not right now.

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, MessageId, SessionId, UserId, ValidationError,
};

/// Errors returned by live-session commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Malformed input (empty title, content out of bounds, ...).
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Actor lacks the required relationship to the session or target.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Requested transition is illegal from the current status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Join would exceed `max_participants`.
    #[error("Session is full ({max} participants)")]
    CapacityExceeded { max: u32 },

    /// Duplicate action on state that already holds.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation is structurally not allowed for this actor/target pairing.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// No active participant row for the user.
    #[error("No active participant '{0}' in session")]
    ParticipantNotFound(UserId),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    /// Storage or publishing adapter failure.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl RoomError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RoomError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn authorization(reason: impl Into<String>) -> Self {
        RoomError::Authorization(reason.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        RoomError::InvalidState(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RoomError::Conflict(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        RoomError::InvalidOperation(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        RoomError::Infrastructure(message.into())
    }

    /// Error code for the edge layer.
    pub fn code(&self) -> ErrorCode {
        match self {
            RoomError::Validation { .. } => ErrorCode::ValidationFailed,
            RoomError::Authorization(_) => ErrorCode::Forbidden,
            RoomError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            RoomError::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            RoomError::Conflict(_) => ErrorCode::Conflict,
            RoomError::InvalidOperation(_) => ErrorCode::InvalidOperation,
            RoomError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            RoomError::ParticipantNotFound(_) => ErrorCode::ParticipantNotFound,
            RoomError::MessageNotFound(_) => ErrorCode::MessageNotFound,
            RoomError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// True for any of the "target is absent" variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RoomError::SessionNotFound(_)
                | RoomError::ParticipantNotFound(_)
                | RoomError::MessageNotFound(_)
        )
    }
}

impl From<ValidationError> for RoomError {
    fn from(err: ValidationError) -> Self {
        RoomError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for RoomError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => RoomError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::Forbidden | ErrorCode::Unauthorized => RoomError::Authorization(err.message),
            ErrorCode::InvalidStateTransition => RoomError::InvalidState(err.message),
            ErrorCode::Conflict => RoomError::Conflict(err.message),
            ErrorCode::InvalidOperation => RoomError::InvalidOperation(err.message),
            _ => RoomError::Infrastructure(err.to_string()),
        }
    }
}
