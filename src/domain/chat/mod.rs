//! Chat domain module.
//!
//! Session chat history with a single pinned slot.

mod events;
mod message;

pub use events::{MessagePinnedStatusChanged, MessageSent};
pub use message::{Message, MAX_MESSAGE_LENGTH};
