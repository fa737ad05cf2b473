//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage
//!
//! - `SessionStore` - Per-session lock boundary around `SessionRoom`
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Time
//!
//! - `Clock` - Source of timestamps

mod clock;
mod event_publisher;
mod event_subscriber;
mod session_store;

pub use clock::Clock;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use session_store::{with_room, AfterCommit, RoomMutation, SessionStore};
