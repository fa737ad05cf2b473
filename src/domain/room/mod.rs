//! Room module - the lockable unit of live-session state.
//!
//! `SessionRoom` owns the session, its participant rows, its chat log and its
//! event sequence. Every command is a method on the room.

mod aggregate;
mod applied;
mod errors;

pub use aggregate::{
    Admission, PinUpdate, RoleUpdate, SessionEnding, SessionRoom, CREATED_SEQUENCE,
};
pub use applied::Applied;
pub use errors::RoomError;
