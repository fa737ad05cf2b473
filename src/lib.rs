//! Live Sessions - live audio rooms.
//!
//! Hosts schedule and run sessions; participants join as listeners, raise
//! hands, get promoted to speakers and chat. Every accepted mutation is
//! published as a sequenced event and fanned out per session in order.
//!
//! Layout:
//! - [`domain`]: the `SessionRoom` aggregate and its policies
//! - [`ports`]: storage, publishing and clock traits
//! - [`adapters`]: in-memory implementations and the per-session channels
//! - [`application`]: one handler per command or query

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
