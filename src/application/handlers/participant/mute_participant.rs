//! Host mute and unmute.
//!
//! One handler serves both directions; `MuteByHost` sets the host flag and
//! `UnmuteByHost` clears both flags so the target can speak at once.

use std::sync::Arc;

use crate::application::handlers::publishing::{commit_and_publish, Staged};
use crate::domain::foundation::{CommandMetadata, SessionId, UserId};
use crate::domain::participant::{MuteCause, MutedStatusChanged, Participant};
use crate::domain::room::RoomError;
use crate::ports::{Clock, EventPublisher, SessionStore};

#[derive(Debug, Clone)]
pub struct MuteParticipantCommand {
    pub session_id: SessionId,
    pub target_user_id: UserId,
    /// `true` mutes, `false` unmutes.
    pub muted: bool,
}

impl MuteParticipantCommand {
    pub fn mute(session_id: SessionId, target_user_id: UserId) -> Self {
        Self {
            session_id,
            target_user_id,
            muted: true,
        }
    }

    pub fn unmute(session_id: SessionId, target_user_id: UserId) -> Self {
        Self {
            session_id,
            target_user_id,
            muted: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MuteParticipantResult {
    pub participant: Participant,
    pub event: MutedStatusChanged,
}

pub struct MuteParticipantHandler {
    store: Arc<dyn SessionStore>,
    event_publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl MuteParticipantHandler {
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
    /// - `Authorization` unless the actor manages the session, or when a
    ///   co-host targets the host
    /// - `InvalidOperation` when the actor targets themselves
    /// - `InvalidState` unless the session is Live
    /// - `ParticipantNotFound` if the target is not active
    /// - `Conflict` if the target is already in the requested state
    #[tracing::instrument(
        skip(self, cmd, metadata),
        fields(session_id = %cmd.session_id, actor = %metadata.user_id, target = %cmd.target_user_id, muted = cmd.muted)
    )]
    pub async fn handle(
        &self,
        cmd: MuteParticipantCommand,
        metadata: CommandMetadata,
    ) -> Result<MuteParticipantResult, RoomError> {
        let actor = metadata.user_id.clone();

        let cause = if cmd.muted {
            MuteCause::HostMuted
        } else {
            MuteCause::HostUnmuted
        };

        let (participant, event) = commit_and_publish(
            self.store.as_ref(),
            self.event_publisher.as_ref(),
            &cmd.session_id,
            |room| {
                let changed_at = room.not_before_latest(self.clock.now());
                let applied = if cmd.muted {
                    room.mute_by_host(&actor, &cmd.target_user_id)?
                } else {
                    room.unmute_by_host(&actor, &cmd.target_user_id)?
                };
                let sequence = applied.sequence();
                let participant = applied.into_value();
                let event = MutedStatusChanged::from_participant(
                    &participant,
                    actor.clone(),
                    cause,
                    changed_at,
                );
                Ok(Staged::for_sequence(
                    (participant, event.clone()),
                    &event,
                    sequence,
                    &metadata,
                ))
            },
        )
        .await?;

        Ok(MuteParticipantResult { participant, event })
    }
}
