//! Participant membership row.
//!
//! One row per join. Leaving stamps `left_at` and keeps the row for history;
//! rejoining creates a fresh row.

use serde::{Deserialize, Serialize};

use super::ParticipantRole;
use crate::domain::foundation::{ParticipantId, SessionId, Timestamp, UserId};
use crate::domain::room::RoomError;

/// A user's membership in a session, from join until leave.
///
/// # Invariants
///
/// - `hand_raised` implies `role == Listener`
/// - demotion to `Listener` always sets `muted_by_host`
/// - an inactive row (`left_at` set) never has `hand_raised`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: ParticipantId,
    session_id: SessionId,
    user_id: UserId,
    role: ParticipantRole,
    joined_at: Timestamp,
    left_at: Option<Timestamp>,
    muted_by_host: bool,
    self_muted: bool,
    hand_raised: bool,
}

impl Participant {
    /// New listener row: both mute flags set, hand down.
    pub(crate) fn join(session_id: SessionId, user_id: UserId, now: Timestamp) -> Self {
        Self {
            id: ParticipantId::new(),
            session_id,
            user_id,
            role: ParticipantRole::Listener,
            joined_at: now,
            left_at: None,
            muted_by_host: true,
            self_muted: true,
            hand_raised: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> ParticipantRole {
        self.role
    }

    pub fn joined_at(&self) -> &Timestamp {
        &self.joined_at
    }

    pub fn left_at(&self) -> Option<&Timestamp> {
        self.left_at.as_ref()
    }

    pub fn muted_by_host(&self) -> bool {
        self.muted_by_host
    }

    pub fn self_muted(&self) -> bool {
        self.self_muted
    }

    pub fn hand_raised(&self) -> bool {
        self.hand_raised
    }

    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }

    /// On stage and not muted by anyone.
    pub fn can_speak(&self) -> bool {
        self.is_active() && self.role.is_on_stage() && !self.muted_by_host && !self.self_muted
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn leave(&mut self, now: Timestamp) {
        self.left_at = Some(now);
        self.hand_raised = false;
    }

    pub(crate) fn raise_hand(&mut self) -> Result<(), RoomError> {
        if !self.role.can_raise_hand() {
            return Err(RoomError::invalid_operation(format!(
                "a {} cannot raise a hand",
                self.role
            )));
        }
        if self.hand_raised {
            return Err(RoomError::conflict("hand is already raised"));
        }
        self.hand_raised = true;
        Ok(())
    }

    pub(crate) fn lower_hand(&mut self) -> Result<(), RoomError> {
        if !self.hand_raised {
            return Err(RoomError::conflict("hand is not raised"));
        }
        self.hand_raised = false;
        Ok(())
    }

    /// Applies a role and its side effects. Returns the previous role.
    ///
    /// Moving on stage clears the raised hand; moving to `Listener` mutes on
    /// both flags.
    pub(crate) fn apply_role(&mut self, role: ParticipantRole) -> ParticipantRole {
        let previous = self.role;
        self.role = role;
        match role {
            ParticipantRole::Listener => {
                self.muted_by_host = true;
                self.self_muted = true;
            }
            ParticipantRole::Speaker | ParticipantRole::CoHost => {
                self.hand_raised = false;
            }
        }
        previous
    }

    pub(crate) fn mute_by_host(&mut self) -> Result<(), RoomError> {
        if self.muted_by_host {
            return Err(RoomError::conflict("participant is already muted by host"));
        }
        self.muted_by_host = true;
        Ok(())
    }

    /// Host override: clears both flags so the user can speak at once.
    pub(crate) fn unmute_by_host(&mut self) -> Result<(), RoomError> {
        if !self.muted_by_host && !self.self_muted {
            return Err(RoomError::conflict("participant is not muted"));
        }
        self.muted_by_host = false;
        self.self_muted = false;
        Ok(())
    }

    pub(crate) fn set_self_muted(&mut self, muted: bool) -> Result<(), RoomError> {
        if !muted && self.muted_by_host {
            return Err(RoomError::authorization(
                "cannot unmute while muted by the host",
            ));
        }
        if self.self_muted == muted {
            return Err(RoomError::conflict(format!(
                "participant is already {}",
                if muted { "muted" } else { "unmuted" }
            )));
        }
        self.self_muted = muted;
        Ok(())
    }
}
