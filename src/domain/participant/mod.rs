//! Participant domain module.
//!
//! Membership rows, speaking roles and the mute/hand-raise state that governs
//! who may speak.
//!
//! # Events
//!
//! - `ParticipantJoined`, `ParticipantLeft`, `ParticipantRemoved`
//! - `HandRaised`, `HandLowered`
//! - `RoleChanged`
//! - `MutedStatusChanged`

mod entity;
mod events;
mod role;

pub use entity::Participant;
pub use events::{
    HandLowered, HandRaised, MuteCause, MutedStatusChanged, ParticipantJoined, ParticipantLeft,
    ParticipantRemoved, RoleChanged,
};
pub use role::ParticipantRole;
