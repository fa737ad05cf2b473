//! Authorization evaluator.
//!
//! Stateless predicates over a [`SessionRoom`] snapshot. Every room mutation
//! consults these before touching state, inside the same lock that applies
//! the change, so the decision can never be made against a stale view.
//!
//! The role-change rules are a closed table over `(manager, from, to)` rather
//! than scattered conditionals; see [`role_change`].

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::participant::ParticipantRole;
use crate::domain::room::{RoomError, SessionRoom};
use crate::domain::session::SessionStatus;

/// How an actor relates to a session right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRelation {
    Host,
    /// Holds an active participant row with this role.
    Participant(ParticipantRole),
    Outsider,
}

impl ActorRelation {
    pub fn resolve(room: &SessionRoom, actor: &UserId) -> Self {
        if room.session().is_host(actor) {
            ActorRelation::Host
        } else if let Some(row) = room.active_participant(actor) {
            ActorRelation::Participant(row.role())
        } else {
            ActorRelation::Outsider
        }
    }

    /// The management authority this relation grants, if any.
    pub fn manager(&self) -> Option<Manager> {
        match self {
            ActorRelation::Host => Some(Manager::Host),
            ActorRelation::Participant(ParticipantRole::CoHost) => Some(Manager::CoHost),
            ActorRelation::Participant(_) | ActorRelation::Outsider => None,
        }
    }

    /// Host or active participant.
    pub fn is_present(&self) -> bool {
        !matches!(self, ActorRelation::Outsider)
    }
}

/// Authority to manage other participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manager {
    Host,
    CoHost,
}

impl Manager {
    /// Co-hosts may not act on other co-hosts or on the host.
    pub fn may_act_on(&self, target: ActorRelation) -> bool {
        match (self, target) {
            (_, ActorRelation::Host) => false,
            (Manager::Host, _) => true,
            (Manager::CoHost, ActorRelation::Participant(ParticipantRole::CoHost)) => false,
            (Manager::CoHost, _) => true,
        }
    }
}

/// Outcome of looking up a role change in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Allowed,
    /// Target already holds the role.
    Unchanged,
    Denied(&'static str),
}

/// Role transition table.
///
/// | manager | from     | to       | outcome   |
/// |---------|----------|----------|-----------|
/// | co-host | co-host  | any      | denied    |
/// | any     | r        | r        | unchanged |
/// | co-host | any      | co-host  | denied    |
/// | co-host | listener | speaker  | allowed   |
/// | co-host | speaker  | listener | allowed   |
/// | host    | any      | any      | allowed   |
pub fn role_change(manager: Manager, from: ParticipantRole, to: ParticipantRole) -> RoleChange {
    use ParticipantRole::{CoHost, Listener, Speaker};

    match (manager, from, to) {
        (Manager::CoHost, CoHost, _) => {
            RoleChange::Denied("co-hosts cannot change another co-host's role")
        }
        (_, Listener, Listener) | (_, Speaker, Speaker) | (_, CoHost, CoHost) => {
            RoleChange::Unchanged
        }
        (Manager::CoHost, _, CoHost) => RoleChange::Denied("only the host can appoint co-hosts"),
        (Manager::CoHost, Listener, Speaker) | (Manager::CoHost, Speaker, Listener) => {
            RoleChange::Allowed
        }
        (Manager::Host, _, _) => RoleChange::Allowed,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Predicates
// ─────────────────────────────────────────────────────────────────────────────

/// Host, or an active co-host.
pub fn can_manage_participants(actor: &UserId, room: &SessionRoom) -> bool {
    ActorRelation::resolve(room, actor).manager().is_some()
}

pub fn can_start(actor: &UserId, room: &SessionRoom) -> bool {
    can_manage_participants(actor, room) && room.session().status() == SessionStatus::Scheduled
}

pub fn can_end(actor: &UserId, room: &SessionRoom) -> bool {
    can_manage_participants(actor, room) && room.session().status() == SessionStatus::Live
}

/// Capacity and ban checks are layered on top by the join itself.
pub fn can_join(room: &SessionRoom) -> bool {
    room.session().is_live()
}

pub fn can_pin(actor: &UserId, room: &SessionRoom) -> bool {
    can_manage_participants(actor, room)
}

pub fn can_send(actor: &UserId, room: &SessionRoom) -> bool {
    room.session().is_live() && ActorRelation::resolve(room, actor).is_present()
}

/// Gate for real-time channel subscriptions: host and active participants.
pub fn can_subscribe(actor: &UserId, room: &SessionRoom) -> bool {
    !room.is_deleted() && ActorRelation::resolve(room, actor).is_present()
}

// ─────────────────────────────────────────────────────────────────────────────
// Decisions
// ─────────────────────────────────────────────────────────────────────────────

/// Result of an authorization check, with enough context to log it.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    pub granted: bool,

    /// Command being authorized (e.g. "change_role").
    pub action: &'static str,

    pub session_id: SessionId,
    pub user_id: UserId,
    pub denial_reason: Option<String>,
}

impl AuthorizationResult {
    pub fn granted(action: &'static str, session_id: SessionId, user_id: &UserId) -> Self {
        Self {
            granted: true,
            action,
            session_id,
            user_id: user_id.clone(),
            denial_reason: None,
        }
    }

    pub fn denied(
        action: &'static str,
        session_id: SessionId,
        user_id: &UserId,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            granted: false,
            action,
            session_id,
            user_id: user_id.clone(),
            denial_reason: Some(reason.into()),
        }
    }

    /// `Ok(())` if granted; logs and returns `Authorization` otherwise.
    pub fn into_result(self) -> Result<(), RoomError> {
        if self.granted {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> RoomError {
        let reason = self
            .denial_reason
            .unwrap_or_else(|| "access denied".to_string());
        tracing::debug!(
            session_id = %self.session_id,
            user_id = %self.user_id,
            action = self.action,
            reason = %reason,
            "authorization denied"
        );
        RoomError::Authorization(reason)
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }
}

/// Logged `Authorization` error for a specific denial.
pub fn deny(
    room: &SessionRoom,
    actor: &UserId,
    action: &'static str,
    reason: impl Into<String>,
) -> RoomError {
    AuthorizationResult::denied(action, *room.session().id(), actor, reason).into_error()
}

/// Requires host or active co-host; returns which.
pub fn require_manager(
    room: &SessionRoom,
    actor: &UserId,
    action: &'static str,
) -> Result<Manager, RoomError> {
    let session_id = *room.session().id();
    ActorRelation::resolve(room, actor).manager().ok_or_else(|| {
        AuthorizationResult::denied(
            action,
            session_id,
            actor,
            "only the host or a co-host can do this",
        )
        .into_error()
    })
}

/// Requires the session host.
pub fn require_host(
    room: &SessionRoom,
    actor: &UserId,
    action: &'static str,
) -> Result<(), RoomError> {
    let session_id = *room.session().id();
    if room.session().is_host(actor) {
        AuthorizationResult::granted(action, session_id, actor).into_result()
    } else {
        AuthorizationResult::denied(action, session_id, actor, "only the host can do this")
            .into_result()
    }
}

/// Requires host or active participant.
pub fn require_present(
    room: &SessionRoom,
    actor: &UserId,
    action: &'static str,
) -> Result<ActorRelation, RoomError> {
    let relation = ActorRelation::resolve(room, actor);
    if relation.is_present() {
        Ok(relation)
    } else {
        Err(AuthorizationResult::denied(
            action,
            *room.session().id(),
            actor,
            "not a member of this session",
        )
        .into_error())
    }
}
