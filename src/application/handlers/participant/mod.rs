//! Participant command handlers.

mod change_role;
mod join_session;
mod leave_session;
mod lower_hand;
mod mute_participant;
mod raise_hand;
mod remove_participant;
mod set_self_mute;

pub use change_role::{ChangeRoleCommand, ChangeRoleHandler, ChangeRoleResult};
pub use join_session::{JoinSessionCommand, JoinSessionHandler, JoinSessionResult};
pub use leave_session::{LeaveSessionCommand, LeaveSessionHandler, LeaveSessionResult};
pub use lower_hand::{LowerHandCommand, LowerHandHandler, LowerHandResult};
pub use mute_participant::{
    MuteParticipantCommand, MuteParticipantHandler, MuteParticipantResult,
};
pub use raise_hand::{RaiseHandCommand, RaiseHandHandler, RaiseHandResult};
pub use remove_participant::{
    RemoveParticipantCommand, RemoveParticipantHandler, RemoveParticipantResult,
};
pub use set_self_mute::{SetSelfMuteCommand, SetSelfMuteHandler, SetSelfMuteResult};
