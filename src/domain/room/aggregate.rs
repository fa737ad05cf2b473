//! SessionRoom aggregate.
//!
//! A room is everything that belongs to one live session: the session entity,
//! every participant row ever opened (active and historical), the chat log,
//! the ban list and the event sequence counter.
//!
//! The room is the unit the [`SessionStore`](crate::ports::SessionStore) locks.
//! Each mutating method below checks authorization, validates preconditions
//! against the current state and applies the change in one call, so callers
//! holding the lock get check-and-mutate atomicity for free.
//!
//! A method that returns `Err` has not touched the room.
//!
//! # Sequencing
//!
//! A successful change bumps `last_sequence` and returns it inside
//! [`Applied::Changed`]; the caller publishes exactly one event stamped with
//! that number. Documented no-ops return [`Applied::Unchanged`] and consume no
//! sequence number.
//!
//! # Time
//!
//! Instants recorded by a room never go backwards. A `now` older than the
//! latest recorded instant is raised to it, so a membership can never close
//! before it opened.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Applied, RoomError};
use crate::domain::chat::Message;
use crate::domain::foundation::{MessageId, SessionId, Timestamp, UserId};
use crate::domain::participant::{Participant, ParticipantRole};
use crate::domain::policy::{self, ActorRelation, RoleChange};
use crate::domain::session::{Session, SessionStatus};

/// Sequence number carried by the `SessionCreated` event.
pub const CREATED_SEQUENCE: u64 = 1;

/// Outcome of ending a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnding {
    pub session: Session,
    /// Memberships closed by the end.
    pub released: usize,
}

/// Outcome of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub participant: Participant,
    pub active_count: usize,
}

/// Outcome of a role change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpdate {
    pub participant: Participant,
    pub previous_role: ParticipantRole,
}

/// Outcome of a pin or unpin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinUpdate {
    pub message: Message,
    /// Previously pinned message displaced by this pin.
    pub unpinned: Option<MessageId>,
}

/// Aggregate root for one live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRoom {
    session: Session,
    /// Every row ever opened, in join order.
    participants: Vec<Participant>,
    /// Chat log, in send order.
    messages: Vec<Message>,
    banned: BTreeSet<UserId>,
    last_sequence: u64,
    /// Latest instant written into the room.
    latest: Timestamp,
    deleted: bool,
}

impl SessionRoom {
    /// Wraps a freshly created session. `SessionCreated` takes sequence 1.
    pub fn new(session: Session) -> Self {
        Self {
            latest: *session.updated_at(),
            session,
            participants: Vec::new(),
            messages: Vec::new(),
            banned: BTreeSet::new(),
            last_sequence: CREATED_SEQUENCE,
            deleted: false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        self.session.id()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// All participant rows, including closed ones.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn active_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_active())
    }

    pub fn active_participant(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants
            .iter()
            .rev()
            .find(|p| p.is_active() && p.user_id() == user_id)
    }

    pub fn active_count(&self) -> usize {
        self.active_participants().count()
    }

    /// Every row the user has held, oldest first.
    pub fn history_of(&self, user_id: &UserId) -> impl Iterator<Item = &Participant> + '_ {
        let user_id = user_id.clone();
        self.participants
            .iter()
            .filter(move |p| p.user_id() == &user_id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, message_id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == message_id)
    }

    pub fn pinned_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_pinned())
    }

    pub fn pinned_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pinned()).count()
    }

    pub fn is_banned(&self, user_id: &UserId) -> bool {
        self.banned.contains(user_id)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Latest instant recorded by any change so far.
    pub fn latest_instant(&self) -> Timestamp {
        self.latest
    }

    pub fn relation_of(&self, user_id: &UserId) -> ActorRelation {
        ActorRelation::resolve(self, user_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Scheduled → Live. Host or co-host.
    pub fn start_session(
        &mut self,
        actor: &UserId,
        now: Timestamp,
    ) -> Result<Applied<Session>, RoomError> {
        if !policy::can_start(actor, self) {
            policy::require_manager(self, actor, "start_session")?;
        }
        let now = self.not_before_latest(now);
        self.session.start(now)?;
        Ok(self.commit_at(now, self.session.clone()))
    }

    /// Live → Ended, closing every open membership at `ended_at`.
    ///
    /// Ending an already-Ended session returns it unchanged for anyone who
    /// managed it at the moment it ended, so racing co-hosts both succeed.
    pub fn end_session(
        &mut self,
        actor: &UserId,
        now: Timestamp,
    ) -> Result<Applied<SessionEnding>, RoomError> {
        if self.session.status() == SessionStatus::Ended {
            if !self.managed_at_end(actor) {
                return Err(policy::deny(
                    self,
                    actor,
                    "end_session",
                    "only the host or a co-host can do this",
                ));
            }
            return Ok(Applied::Unchanged(SessionEnding {
                session: self.session.clone(),
                released: 0,
            }));
        }

        if !policy::can_end(actor, self) {
            policy::require_manager(self, actor, "end_session")?;
        }
        let now = self.not_before_latest(now);
        self.session.end(now)?;

        let ended_at = self.session.ended_at().copied().unwrap_or(now);
        let mut released = 0;
        for row in self.participants.iter_mut().filter(|p| p.is_active()) {
            row.leave(ended_at);
            released += 1;
        }

        Ok(self.commit_at(
            ended_at,
            SessionEnding {
                session: self.session.clone(),
                released,
            },
        ))
    }

    /// Scheduled → Cancelled. Host or co-host.
    pub fn cancel_session(
        &mut self,
        actor: &UserId,
        now: Timestamp,
    ) -> Result<Applied<Session>, RoomError> {
        policy::require_manager(self, actor, "cancel_session")?;
        let now = self.not_before_latest(now);
        self.session.cancel(now)?;
        Ok(self.commit_at(now, self.session.clone()))
    }

    /// Marks the room deleted. Host only; refused while Live.
    pub fn delete_session(&mut self, actor: &UserId) -> Result<Applied<Session>, RoomError> {
        policy::require_host(self, actor, "delete_session")?;
        self.session.ensure_deletable()?;
        self.deleted = true;
        Ok(self.commit(self.session.clone()))
    }

    pub fn set_recording(
        &mut self,
        actor: &UserId,
        enabled: bool,
        now: Timestamp,
    ) -> Result<Applied<Session>, RoomError> {
        policy::require_manager(self, actor, "set_recording")?;
        let now = self.not_before_latest(now);
        self.session.set_recording(enabled, now)?;
        Ok(self.commit_at(now, self.session.clone()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Membership
    // ─────────────────────────────────────────────────────────────────────────

    /// Admits `user_id` as a listener.
    ///
    /// Rejoining while already active returns the existing row unchanged.
    /// Capacity is counted over active rows only.
    pub fn join(
        &mut self,
        user_id: &UserId,
        role: ParticipantRole,
        now: Timestamp,
    ) -> Result<Applied<Admission>, RoomError> {
        if !policy::can_join(self) {
            return Err(RoomError::invalid_state(format!(
                "cannot join a {} session",
                self.session.status()
            )));
        }
        if self.session.is_host(user_id) {
            return Err(RoomError::invalid_operation(
                "the host is always present and does not join",
            ));
        }
        if role != ParticipantRole::Listener {
            return Err(policy::deny(
                self,
                user_id,
                "join",
                format!("cannot join as {}; roles are granted by the host", role),
            ));
        }
        if self.is_banned(user_id) {
            return Err(policy::deny(
                self,
                user_id,
                "join",
                "banned from this session",
            ));
        }
        if let Some(existing) = self.active_participant(user_id) {
            return Ok(Applied::Unchanged(Admission {
                participant: existing.clone(),
                active_count: self.active_count(),
            }));
        }

        let active = self.active_count();
        if let Some(max) = self.session.max_participants() {
            if active >= max as usize {
                return Err(RoomError::CapacityExceeded { max });
            }
        }

        let now = self.not_before_latest(now);
        let participant = Participant::join(*self.session.id(), user_id.clone(), now);
        self.participants.push(participant.clone());
        Ok(self.commit_at(
            now,
            Admission {
                participant,
                active_count: active + 1,
            },
        ))
    }

    /// Closes the user's active row. The host cannot leave.
    pub fn leave(
        &mut self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Applied<Participant>, RoomError> {
        if self.session.is_host(user_id) {
            return Err(RoomError::invalid_operation(
                "the host cannot leave; end the session instead",
            ));
        }
        let now = self.not_before_latest(now);
        let row = self.active_row_mut(user_id)?;
        row.leave(now);
        let participant = row.clone();
        Ok(self.commit_at(now, participant))
    }

    pub fn raise_hand(&mut self, user_id: &UserId) -> Result<Applied<Participant>, RoomError> {
        self.session.ensure_live()?;
        let row = self.active_row_mut(user_id)?;
        row.raise_hand()?;
        let participant = row.clone();
        Ok(self.commit(participant))
    }

    /// The participant themselves or a manager may lower a hand.
    pub fn lower_hand(
        &mut self,
        actor: &UserId,
        target: &UserId,
    ) -> Result<Applied<Participant>, RoomError> {
        if actor != target && !policy::can_manage_participants(actor, self) {
            return Err(policy::deny(
                self,
                actor,
                "lower_hand",
                "only the participant or a manager can lower a hand",
            ));
        }
        let row = self.active_row_mut(target)?;
        row.lower_hand()?;
        let participant = row.clone();
        Ok(self.commit(participant))
    }

    /// Changes `target`'s role according to the role transition table.
    pub fn change_role(
        &mut self,
        actor: &UserId,
        target: &UserId,
        role: ParticipantRole,
    ) -> Result<Applied<RoleUpdate>, RoomError> {
        if self.session.is_host(target) {
            return Err(policy::deny(
                self,
                actor,
                "change_role",
                "the host's role cannot be changed",
            ));
        }
        let manager = policy::require_manager(self, actor, "change_role")?;
        self.session.ensure_live()?;

        let current = self
            .active_participant(target)
            .map(|p| p.role())
            .ok_or_else(|| RoomError::ParticipantNotFound(target.clone()))?;

        match policy::role_change(manager, current, role) {
            RoleChange::Denied(reason) => Err(policy::deny(self, actor, "change_role", reason)),
            RoleChange::Unchanged => Err(RoomError::conflict(format!(
                "participant is already a {}",
                role
            ))),
            RoleChange::Allowed => {
                let row = self.active_row_mut(target)?;
                let previous_role = row.apply_role(role);
                let participant = row.clone();
                Ok(self.commit(RoleUpdate {
                    participant,
                    previous_role,
                }))
            }
        }
    }

    pub fn mute_by_host(
        &mut self,
        actor: &UserId,
        target: &UserId,
    ) -> Result<Applied<Participant>, RoomError> {
        self.authorize_mute(actor, target, "mute_by_host")?;
        let row = self.active_row_mut(target)?;
        row.mute_by_host()?;
        let participant = row.clone();
        Ok(self.commit(participant))
    }

    /// Clears both mute flags on the target.
    pub fn unmute_by_host(
        &mut self,
        actor: &UserId,
        target: &UserId,
    ) -> Result<Applied<Participant>, RoomError> {
        self.authorize_mute(actor, target, "unmute_by_host")?;
        let row = self.active_row_mut(target)?;
        row.unmute_by_host()?;
        let participant = row.clone();
        Ok(self.commit(participant))
    }

    pub fn set_self_mute(
        &mut self,
        user_id: &UserId,
        muted: bool,
    ) -> Result<Applied<Participant>, RoomError> {
        self.session.ensure_live()?;
        let row = self.active_row_mut(user_id)?;
        row.set_self_muted(muted)?;
        let participant = row.clone();
        Ok(self.commit(participant))
    }

    /// Kicks an active participant, optionally banning them from rejoining.
    pub fn remove_participant(
        &mut self,
        actor: &UserId,
        target: &UserId,
        ban: bool,
        now: Timestamp,
    ) -> Result<Applied<Participant>, RoomError> {
        if self.session.is_host(target) {
            return Err(policy::deny(
                self,
                actor,
                "remove_participant",
                "the host cannot be removed",
            ));
        }
        let manager = policy::require_manager(self, actor, "remove_participant")?;
        if actor == target {
            return Err(RoomError::invalid_operation(
                "use leave to exit the session yourself",
            ));
        }
        let target_relation = self.relation_of(target);
        if !target_relation.is_present() {
            return Err(RoomError::ParticipantNotFound(target.clone()));
        }
        if !manager.may_act_on(target_relation) {
            return Err(policy::deny(
                self,
                actor,
                "remove_participant",
                "co-hosts cannot remove other co-hosts",
            ));
        }

        let now = self.not_before_latest(now);
        let row = self.active_row_mut(target)?;
        row.leave(now);
        let participant = row.clone();
        if ban {
            self.banned.insert(target.clone());
        }
        Ok(self.commit_at(now, participant))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────────

    pub fn send_message(
        &mut self,
        sender: &UserId,
        content: String,
        now: Timestamp,
    ) -> Result<Applied<Message>, RoomError> {
        Message::validate_content(&content)?;
        if !policy::can_send(sender, self) {
            self.session.ensure_live()?;
            policy::require_present(self, sender, "send_message")?;
        }

        let now = self.not_before_latest(now);
        let message = Message::compose(*self.session.id(), sender.clone(), content, now)?;
        self.messages.push(message.clone());
        Ok(self.commit_at(now, message))
    }

    /// Pins or unpins a message. Pinning displaces any other pinned message in
    /// the same change, so at most one message is ever pinned.
    pub fn set_pinned(
        &mut self,
        actor: &UserId,
        message_id: &MessageId,
        pin: bool,
    ) -> Result<Applied<PinUpdate>, RoomError> {
        if !policy::can_pin(actor, self) {
            return Err(policy::deny(
                self,
                actor,
                "pin_message",
                "only the host or a co-host can pin messages",
            ));
        }
        self.session.ensure_live()?;

        let index = self
            .messages
            .iter()
            .position(|m| m.id() == message_id)
            .ok_or(RoomError::MessageNotFound(*message_id))?;

        if self.messages[index].is_pinned() == pin {
            return Ok(Applied::Unchanged(PinUpdate {
                message: self.messages[index].clone(),
                unpinned: None,
            }));
        }

        let mut unpinned = None;
        if pin {
            for other in self.messages.iter_mut().filter(|m| m.is_pinned()) {
                other.set_pinned(false);
                unpinned = Some(*other.id());
            }
        }
        self.messages[index].set_pinned(pin);
        let message = self.messages[index].clone();
        Ok(self.commit(PinUpdate { message, unpinned }))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signaling
    // ─────────────────────────────────────────────────────────────────────────

    /// Reserves a sequence slot for a signal between two present members.
    pub fn relay_signal(
        &mut self,
        sender: &UserId,
        recipient: &UserId,
    ) -> Result<Applied<()>, RoomError> {
        self.session.ensure_live()?;
        policy::require_present(self, sender, "relay_signal")?;
        if sender == recipient {
            return Err(RoomError::invalid_operation("cannot signal yourself"));
        }
        if !self.relation_of(recipient).is_present() {
            return Err(RoomError::ParticipantNotFound(recipient.clone()));
        }
        Ok(self.commit(()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn commit<T>(&mut self, value: T) -> Applied<T> {
        self.last_sequence += 1;
        Applied::Changed {
            value,
            sequence: self.last_sequence,
        }
    }

    fn commit_at<T>(&mut self, at: Timestamp, value: T) -> Applied<T> {
        self.latest = self.latest.max(at);
        self.commit(value)
    }

    /// `now`, raised to the latest instant already recorded in the room.
    pub fn not_before_latest(&self, now: Timestamp) -> Timestamp {
        now.max(self.latest)
    }

    fn active_row_mut(&mut self, user_id: &UserId) -> Result<&mut Participant, RoomError> {
        self.participants
            .iter_mut()
            .rev()
            .find(|p| p.is_active() && p.user_id() == user_id)
            .ok_or_else(|| RoomError::ParticipantNotFound(user_id.clone()))
    }

    /// Shared preconditions for host mute and unmute.
    fn authorize_mute(
        &self,
        actor: &UserId,
        target: &UserId,
        action: &'static str,
    ) -> Result<(), RoomError> {
        policy::require_manager(self, actor, action)?;
        if actor == target {
            return Err(RoomError::invalid_operation(
                "use self-mute to change your own microphone",
            ));
        }
        if self.session.is_host(target) {
            return Err(policy::deny(
                self,
                actor,
                action,
                "co-hosts cannot mute or unmute the host",
            ));
        }
        self.session.ensure_live()
    }

    /// Host, or a co-host whose row was closed by the end itself.
    fn managed_at_end(&self, actor: &UserId) -> bool {
        if self.session.is_host(actor) {
            return true;
        }
        let Some(ended_at) = self.session.ended_at() else {
            return false;
        };
        self.history_of(actor).any(|p| {
            p.role() == ParticipantRole::CoHost && p.left_at() == Some(ended_at)
        })
    }
}
