//! ChangeRoleHandler - Promote or demote a participant.
//!
//! Legality comes from the role transition table in `domain::policy`; the
//! target row is re-read under the session lock before the new role is
//! written.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, EventId, SessionId, UserId};
use crate::domain::participant::{Participant, ParticipantRole, RoleChanged};
use crate::domain::room::{RoleUpdate, RoomError};
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct ChangeRoleCommand {
    pub session_id: SessionId,
    pub target_user_id: UserId,
    pub new_role: ParticipantRole,
}

#[derive(Debug, Clone)]
pub struct ChangeRoleResult {
    pub participant: Participant,
    pub event: RoleChanged,
}

pub struct ChangeRoleHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl ChangeRoleHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        event_publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            event_publisher,
            clock,
        }
    }

    /// # Errors
    ///
    /// - `Authorization` if the target is the host, the actor is not a
    ///   manager, or a co-host attempts a host-only transition
    /// - `InvalidState` unless the session is Live
    /// - `ParticipantNotFound` if the target is not active
    /// - `Conflict` if the target already has `new_role`
    #[tracing::instrument(
        skip(self, cmd, metadata),
        fields(session_id = %cmd.session_id, actor = %metadata.user_id, target = %cmd.target_user_id, new_role = %cmd.new_role)
    )]
    pub async fn handle(
        &self,
        cmd: ChangeRoleCommand,
        metadata: CommandMetadata,
    ) -> Result<ChangeRoleResult, RoomError> {
        let actor = metadata.user_id.clone();

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let changed_at = room.not_before_latest(self.clock.now());
                let applied = room.change_role(&actor, &cmd.target_user_id, cmd.new_role)?;
                let sequence = applied.sequence();
                let RoleUpdate {
                    participant,
                    previous_role,
                } = applied.into_value();
                let event = RoleChanged {
                    event_id: EventId::new(),
                    session_id: cmd.session_id,
                    participant_id: *participant.id(),
                    user_id: cmd.target_user_id.clone(),
                    changed_by: actor.clone(),
                    old_role: previous_role,
                    new_role: participant.role(),
                    muted_by_host: participant.muted_by_host(),
                    self_muted: participant.self_muted(),
                    hand_raised: participant.hand_raised(),
                    changed_at,
                };
                Ok(Staged::for_sequence(
                    (participant, event.clone()),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        tracing::debug!(old_role = %event.old_role, "role changed");
        Ok(ChangeRoleResult { participant, event })
    }
}
