//! Participant events.
//!
//! - `ParticipantJoined` / `ParticipantLeft` - Membership opened or closed
//! - `HandRaised` / `HandLowered` - Stage queue changes
//! - `RoleChanged` - Role set by the host or a co-host
//! - `MutedStatusChanged` - Either mute flag changed
//! - `ParticipantRemoved` - Kicked (and possibly banned) by a manager

use serde::{Deserialize, Serialize};

use super::{Participant, ParticipantRole};
use crate::domain::foundation::{
    domain_event, EventId, ParticipantId, SessionId, Timestamp, UserId,
};

// ════════════════════════════════════════════════════════════════════════════
// ParticipantJoined
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantJoined {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub user_id: UserId,
    pub role: ParticipantRole,

    /// Active participants after this join.
    pub active_count: usize,

    pub joined_at: Timestamp,
}

domain_event!(
    ParticipantJoined,
    event_type = "participant.joined.v1",
    aggregate_id = session_id,
    occurred_at = joined_at,
    event_id = event_id
);

impl ParticipantJoined {
    pub fn from_participant(participant: &Participant, active_count: usize) -> Self {
        Self {
            event_id: EventId::new(),
            session_id: *participant.session_id(),
            participant_id: *participant.id(),
            user_id: participant.user_id().clone(),
            role: participant.role(),
            active_count,
            joined_at: *participant.joined_at(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticipantLeft
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantLeft {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub user_id: UserId,
    pub left_at: Timestamp,
}

domain_event!(
    ParticipantLeft,
    event_type = "participant.left.v1",
    aggregate_id = session_id,
    occurred_at = left_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// HandRaised / HandLowered
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandRaised {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub user_id: UserId,
    pub raised_at: Timestamp,
}

domain_event!(
    HandRaised,
    event_type = "participant.hand_raised.v1",
    aggregate_id = session_id,
    occurred_at = raised_at,
    event_id = event_id
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandLowered {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub user_id: UserId,

    /// The participant themselves or the manager who dismissed the hand.
    pub lowered_by: UserId,

    pub lowered_at: Timestamp,
}

domain_event!(
    HandLowered,
    event_type = "participant.hand_lowered.v1",
    aggregate_id = session_id,
    occurred_at = lowered_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// RoleChanged
// ════════════════════════════════════════════════════════════════════════════

/// Published when a manager changes a participant's role.
///
/// Carries the resulting flags so clients don't need a follow-up
/// `MutedStatusChanged` for the demotion side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChanged {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub user_id: UserId,
    pub changed_by: UserId,
    pub old_role: ParticipantRole,
    pub new_role: ParticipantRole,
    pub muted_by_host: bool,
    pub self_muted: bool,
    pub hand_raised: bool,
    pub changed_at: Timestamp,
}

domain_event!(
    RoleChanged,
    event_type = "participant.role_changed.v1",
    aggregate_id = session_id,
    occurred_at = changed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// MutedStatusChanged
// ════════════════════════════════════════════════════════════════════════════

/// What caused a mute flag to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuteCause {
    HostMuted,
    HostUnmuted,
    SelfMuted,
    SelfUnmuted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutedStatusChanged {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub user_id: UserId,
    pub changed_by: UserId,
    pub cause: MuteCause,
    pub muted_by_host: bool,
    pub self_muted: bool,
    pub changed_at: Timestamp,
}

domain_event!(
    MutedStatusChanged,
    event_type = "participant.muted_status_changed.v1",
    aggregate_id = session_id,
    occurred_at = changed_at,
    event_id = event_id
);

impl MutedStatusChanged {
    pub fn from_participant(
        participant: &Participant,
        changed_by: UserId,
        cause: MuteCause,
        changed_at: Timestamp,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            session_id: *participant.session_id(),
            participant_id: *participant.id(),
            user_id: participant.user_id().clone(),
            changed_by,
            cause,
            muted_by_host: participant.muted_by_host(),
            self_muted: participant.self_muted(),
            changed_at,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticipantRemoved
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRemoved {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub user_id: UserId,
    pub removed_by: UserId,

    /// Whether the user may not rejoin.
    pub banned: bool,

    pub removed_at: Timestamp,
}

domain_event!(
    ParticipantRemoved,
    event_type = "participant.removed.v1",
    aggregate_id = session_id,
    occurred_at = removed_at,
    event_id = event_id
);
