//! Event adapters.
//!
//! - `InMemoryEventBus` - In-process bus, also used to capture events in tests
//! - `SessionChannels` - Per-session ordered broadcast of committed events
//! - `SessionEventBridge` - Feeds the bus into `SessionChannels`

mod in_memory;
mod session_bridge;
mod session_channels;

pub use in_memory::InMemoryEventBus;
pub use session_bridge::{SessionEventBridge, SESSION_EVENT_TYPES};
pub use session_channels::{Delivery, SessionChannels};
