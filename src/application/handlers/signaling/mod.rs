//! Signaling relay handler.

mod relay_signal;

pub use relay_signal::{RelaySignalCommand, RelaySignalHandler};
