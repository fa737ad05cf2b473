//! Application handlers.
//!
//! One handler per inbound command or query. Every command handler follows
//! the same shape:
//!
//! 1. Read the actor from `CommandMetadata`
//! 2. Under the session lock, read the `Clock` and run the room mutation
//! 3. Still under the lock, publish the event stamped with the sequence the
//!    mutation committed, if it changed anything (`commit_and_publish`)

pub mod chat;
pub mod participant;
pub mod session;
pub mod signaling;

mod publishing;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat::{
    ListMessagesHandler, ListMessagesQuery, PinMessageCommand, PinMessageHandler,
    PinMessageResult, SendMessageCommand, SendMessageHandler, SendMessageResult,
};
pub use participant::{
    ChangeRoleCommand, ChangeRoleHandler, ChangeRoleResult, JoinSessionCommand,
    JoinSessionHandler, JoinSessionResult, LeaveSessionCommand, LeaveSessionHandler,
    LeaveSessionResult, LowerHandCommand, LowerHandHandler, LowerHandResult,
    MuteParticipantCommand, MuteParticipantHandler, MuteParticipantResult, RaiseHandCommand,
    RaiseHandHandler, RaiseHandResult, RemoveParticipantCommand, RemoveParticipantHandler,
    RemoveParticipantResult, SetSelfMuteCommand, SetSelfMuteHandler, SetSelfMuteResult,
};
pub use session::{
    AuthorizeSubscriptionHandler, AuthorizeSubscriptionQuery, CancelSessionCommand,
    CancelSessionHandler, CancelSessionResult, CreateSessionCommand, CreateSessionHandler,
    CreateSessionResult, DeleteSessionCommand, DeleteSessionHandler, EndSessionCommand,
    EndSessionHandler, EndSessionResult, GetSessionHandler, GetSessionQuery, SessionView,
    SetRecordingCommand, SetRecordingHandler, SetRecordingResult, StartSessionCommand,
    StartSessionHandler, StartSessionResult,
};
pub use signaling::{RelaySignalCommand, RelaySignalHandler};
