//! Session domain module.
//!
//! Handles the live-session lifecycle: creation, going live, ending,
//! cancellation and deletion.
//!
//! # Events
//!
//! - `SessionCreated` - Published when a host creates a session
//! - `SessionStarted` - Published when a scheduled session goes live
//! - `SessionEnded` - Published when a live session ends
//! - `SessionCancelled` - Published when a scheduled session is cancelled
//! - `SessionDeleted` - Published when the host deletes a session
//! - `RecordingStatusChanged` - Published when recording is toggled

mod aggregate;
mod events;
mod status;

pub use aggregate::{NewSession, Session, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
pub use events::{
    RecordingStatusChanged, SessionCancelled, SessionCreated, SessionDeleted, SessionEnded,
    SessionStarted,
};
pub use status::SessionStatus;
