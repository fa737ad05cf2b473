//! Session command and query handlers.

mod cancel_session;
mod create_session;
mod delete_session;
mod end_session;
mod get_session;
mod set_recording;
mod start_session;

pub use cancel_session::{CancelSessionCommand, CancelSessionHandler, CancelSessionResult};
pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use delete_session::{DeleteSessionCommand, DeleteSessionHandler};
pub use end_session::{EndSessionCommand, EndSessionHandler, EndSessionResult};
pub use get_session::{
    AuthorizeSubscriptionHandler, AuthorizeSubscriptionQuery, GetSessionHandler, GetSessionQuery,
    SessionView,
};
pub use set_recording::{SetRecordingCommand, SetRecordingHandler, SetRecordingResult};
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
