//! Chat command and query handlers.

mod list_messages;
mod pin_message;
mod send_message;

pub use list_messages::{ListMessagesHandler, ListMessagesQuery};
pub use pin_message::{PinMessageCommand, PinMessageHandler, PinMessageResult};
pub use send_message::{SendMessageCommand, SendMessageHandler, SendMessageResult};
