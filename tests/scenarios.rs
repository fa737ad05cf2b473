//! End-to-end command scenarios through the application handlers.

mod common;

use common::{as_user, user, App};
use live_sessions::application::*;
use live_sessions::domain::participant::ParticipantRole;
use live_sessions::domain::room::RoomError;
use live_sessions::domain::session::SessionStatus;
use live_sessions::ports::Clock;

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn scheduled_session_starts_before_its_scheduled_time() {
    let app = App::new();
    let id = app.scheduled_session(60).await;

    let result = app
        .start
        .handle(StartSessionCommand { session_id: id }, as_user("host"))
        .await
        .unwrap();

    assert_eq!(result.session.status(), SessionStatus::Live);
    assert_eq!(result.session.started_at(), Some(&app.clock.now()));
    assert_eq!(
        app.event_types(),
        vec!["session.created.v1", "session.started.v1"]
    );
}

#[tokio::test]
async fn start_and_end_only_from_their_source_states() {
    let app = App::new();
    let scheduled = app.scheduled_session(30).await;
    let live = app.live_session(None).await;

    let end_scheduled = app
        .end
        .handle(EndSessionCommand { session_id: scheduled }, as_user("host"))
        .await;
    assert!(matches!(end_scheduled, Err(RoomError::InvalidState(_))));

    let start_live = app
        .start
        .handle(StartSessionCommand { session_id: live }, as_user("host"))
        .await;
    assert!(matches!(start_live, Err(RoomError::InvalidState(_))));

    app.end
        .handle(EndSessionCommand { session_id: live }, as_user("host"))
        .await
        .unwrap();
    let restart = app
        .start
        .handle(StartSessionCommand { session_id: live }, as_user("host"))
        .await;
    assert!(matches!(restart, Err(RoomError::InvalidState(_))));

    app.cancel
        .handle(CancelSessionCommand { session_id: scheduled }, as_user("host"))
        .await
        .unwrap();
    let start_cancelled = app
        .start
        .handle(StartSessionCommand { session_id: scheduled }, as_user("host"))
        .await;
    assert!(matches!(start_cancelled, Err(RoomError::InvalidState(_))));
}

#[tokio::test]
async fn ending_twice_returns_the_same_ended_session() {
    let app = App::new();
    let id = app.live_session(None).await;
    app.join_listener(id, "alice").await;
    app.clock.advance_secs(95);

    let first = app
        .end
        .handle(EndSessionCommand { session_id: id }, as_user("host"))
        .await
        .unwrap();
    app.clock.advance_secs(30);
    let second = app
        .end
        .handle(EndSessionCommand { session_id: id }, as_user("host"))
        .await
        .unwrap();

    assert_eq!(first.session.duration_seconds(), Some(95));
    assert!(first.event.is_some());
    assert!(second.event.is_none());
    assert_eq!(first.session, second.session);
    assert_eq!(app.bus.events_of_type("session.ended.v1").len(), 1);
}

#[tokio::test]
async fn ending_closes_every_membership() {
    let app = App::new();
    let id = app.live_session(None).await;
    app.join_listener(id, "alice").await;
    app.join_listener(id, "bob").await;
    app.raise_hand
        .handle(RaiseHandCommand { session_id: id }, as_user("bob"))
        .await
        .unwrap();

    let ended = app
        .end
        .handle(EndSessionCommand { session_id: id }, as_user("host"))
        .await
        .unwrap();

    let view = app
        .get
        .handle(GetSessionQuery {
            session_id: id,
            user_id: user("host"),
        })
        .await
        .unwrap();
    assert!(view.active_participants.is_empty());
    assert_eq!(ended.event.unwrap().participants_released, 2);
}

#[tokio::test]
async fn deleted_session_disappears() {
    let app = App::new();
    let id = app.live_session(None).await;

    let while_live = app
        .delete
        .handle(DeleteSessionCommand { session_id: id }, as_user("host"))
        .await;
    assert!(matches!(while_live, Err(RoomError::InvalidState(_))));

    app.end
        .handle(EndSessionCommand { session_id: id }, as_user("host"))
        .await
        .unwrap();
    app.delete
        .handle(DeleteSessionCommand { session_id: id }, as_user("host"))
        .await
        .unwrap();

    let lookup = app
        .get
        .handle(GetSessionQuery {
            session_id: id,
            user_id: user("host"),
        })
        .await;
    assert_eq!(lookup.unwrap_err(), RoomError::SessionNotFound(id));
}

// =============================================================================
// Participants
// =============================================================================

#[tokio::test]
async fn capacity_frees_up_when_someone_leaves() {
    let app = App::new();
    let id = app.live_session(Some(1)).await;

    let alice = app
        .join
        .handle(JoinSessionCommand::listener(id), as_user("alice"))
        .await
        .unwrap();
    assert_eq!(alice.participant.role(), ParticipantRole::Listener);
    assert!(alice.participant.muted_by_host());

    let bob_first = app
        .join
        .handle(JoinSessionCommand::listener(id), as_user("bob"))
        .await;
    assert_eq!(bob_first.unwrap_err(), RoomError::CapacityExceeded { max: 1 });

    app.leave
        .handle(LeaveSessionCommand { session_id: id }, as_user("alice"))
        .await
        .unwrap();

    let bob_second = app
        .join
        .handle(JoinSessionCommand::listener(id), as_user("bob"))
        .await
        .unwrap();
    assert!(bob_second.participant.is_active());
}

#[tokio::test]
async fn user_can_rejoin_after_leaving() {
    let app = App::new();
    let id = app.live_session(None).await;
    app.join_listener(id, "alice").await;
    app.leave
        .handle(LeaveSessionCommand { session_id: id }, as_user("alice"))
        .await
        .unwrap();

    let rejoined = app
        .join
        .handle(JoinSessionCommand::listener(id), as_user("alice"))
        .await
        .unwrap();

    assert!(rejoined.event.is_some());
    assert_eq!(rejoined.participant.role(), ParticipantRole::Listener);
    assert_eq!(app.bus.events_of_type("participant.joined.v1").len(), 2);
}

#[tokio::test]
async fn promotion_lowers_a_raised_hand() {
    let app = App::new();
    let id = app.live_session(None).await;
    app.join_listener(id, "alice").await;

    let raised = app
        .raise_hand
        .handle(RaiseHandCommand { session_id: id }, as_user("alice"))
        .await
        .unwrap();
    assert!(raised.participant.hand_raised());

    let promoted = app
        .change_role
        .handle(
            ChangeRoleCommand {
                session_id: id,
                target_user_id: user("alice"),
                new_role: ParticipantRole::Speaker,
            },
            as_user("host"),
        )
        .await
        .unwrap();

    assert_eq!(promoted.participant.role(), ParticipantRole::Speaker);
    assert!(!promoted.participant.hand_raised());
    assert_eq!(promoted.event.old_role, ParticipantRole::Listener);
}

#[tokio::test]
async fn nobody_can_change_the_hosts_role() {
    let app = App::new();
    let id = app.live_session(None).await;
    app.join_listener(id, "cohost").await;
    app.promote(id, "cohost", ParticipantRole::CoHost).await;
    app.join_listener(id, "listener").await;

    for actor in ["host", "cohost", "listener", "stranger"] {
        for new_role in [
            ParticipantRole::Listener,
            ParticipantRole::Speaker,
            ParticipantRole::CoHost,
        ] {
            let result = app
                .change_role
                .handle(
                    ChangeRoleCommand {
                        session_id: id,
                        target_user_id: user("host"),
                        new_role,
                    },
                    as_user(actor),
                )
                .await;
            assert!(
                matches!(result, Err(RoomError::Authorization(_))),
                "{actor} -> {new_role}: {result:?}"
            );
        }
    }
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn pinning_moves_the_single_pin() {
    let app = App::new();
    let id = app.live_session(None).await;
    let mut ids = Vec::new();
    for content in ["first", "second"] {
        let sent = app
            .send
            .handle(
                SendMessageCommand {
                    session_id: id,
                    content: content.to_string(),
                },
                as_user("host"),
            )
            .await
            .unwrap();
        ids.push(*sent.message.id());
    }
    let (m1, m2) = (ids[0], ids[1]);
    let pin = |message_id, pin| PinMessageCommand {
        session_id: id,
        message_id,
        pin,
    };

    app.pin.handle(pin(m1, true), as_user("host")).await.unwrap();
    let second = app.pin.handle(pin(m2, true), as_user("host")).await.unwrap();
    assert_eq!(second.event.unwrap().unpinned_message_id, Some(m1));

    let messages = app
        .list_messages
        .handle(ListMessagesQuery {
            session_id: id,
            user_id: user("host"),
        })
        .await
        .unwrap();
    assert!(!messages[0].is_pinned());
    assert!(messages[1].is_pinned());

    app.pin.handle(pin(m2, false), as_user("host")).await.unwrap();
    let messages = app
        .list_messages
        .handle(ListMessagesQuery {
            session_id: id,
            user_id: user("host"),
        })
        .await
        .unwrap();
    assert!(messages.iter().all(|m| !m.is_pinned()));
    assert_eq!(
        messages.iter().map(|m| m.content()).collect::<Vec<_>>(),
        vec!["first", "second"]
    );
}

#[tokio::test]
async fn outsiders_cannot_read_the_room() {
    let app = App::new();
    let id = app.live_session(None).await;
    app.join_listener(id, "alice").await;

    let outsider = app
        .get
        .handle(GetSessionQuery {
            session_id: id,
            user_id: user("mallory"),
        })
        .await;
    assert!(matches!(outsider, Err(RoomError::Authorization(_))));

    let member = app
        .get
        .handle(GetSessionQuery {
            session_id: id,
            user_id: user("alice"),
        })
        .await
        .unwrap();
    assert_eq!(member.active_participants.len(), 1);
}
