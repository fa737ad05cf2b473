//! Adapters - Implementations of port interfaces.
//!
//! - `store` - Session store with per-session locking
//! - `events` - In-process event bus and per-session ordered fan-out
//! - `clock` - System and manual clocks

pub mod clock;
pub mod events;
pub mod store;

pub use clock::{ManualClock, SystemClock};
pub use events::{Delivery, InMemoryEventBus, SessionChannels, SessionEventBridge};
pub use store::InMemorySessionStore;
