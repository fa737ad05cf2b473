//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, events)
//! - `session` - Session entity and lifecycle events
//! - `participant` - Membership rows, roles, mute and hand-raise state
//! - `chat` - Chat messages and the pinned slot
//! - `signaling` - Opaque WebRTC signal relay
//! - `policy` - Authorization predicates and the role transition table
//! - `room` - `SessionRoom` aggregate, the unit of locking and sequencing

pub mod chat;
pub mod foundation;
pub mod participant;
pub mod policy;
pub mod room;
pub mod session;
pub mod signaling;
