//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors, the state machine trait and
//! the event/command plumbing that form the vocabulary of the live-session
//! domain.

mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventMetadata, SerializableDomainEvent,
    LIVE_SESSION_AGGREGATE,
};
pub use ids::{EventId, MessageId, ParticipantId, SessionId, UserId};
pub use state_machine::{IllegalTransition, StateMachine};
pub use timestamp::Timestamp;
