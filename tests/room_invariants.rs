//! Property tests: room invariants hold after any sequence of commands.
//!
//! Commands are applied straight to a `SessionRoom`, including ones that are
//! rejected. Rejections must leave no trace and accepted commands must keep
//! the room consistent.

use proptest::prelude::*;

use live_sessions::domain::foundation::{MessageId, SessionId, Timestamp, UserId};
use live_sessions::domain::participant::ParticipantRole;
use live_sessions::domain::room::{Applied, SessionRoom, CREATED_SEQUENCE};
use live_sessions::domain::session::{NewSession, Session};

const USERS: &[&str] = &["host", "ana", "ben", "cai", "dee", "eli"];

#[derive(Debug, Clone)]
enum Op {
    Join(usize),
    Leave(usize),
    RaiseHand(usize),
    ChangeRole { actor: usize, target: usize, role: ParticipantRole },
    Send(usize),
    Pin { actor: usize, message: usize, pin: bool },
    HostMute(usize),
}

fn role() -> impl Strategy<Value = ParticipantRole> {
    prop_oneof![
        Just(ParticipantRole::Listener),
        Just(ParticipantRole::Speaker),
        Just(ParticipantRole::CoHost),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    let who = 0..USERS.len();
    prop_oneof![
        3 => who.clone().prop_map(Op::Join),
        1 => who.clone().prop_map(Op::Leave),
        1 => who.clone().prop_map(Op::RaiseHand),
        2 => (who.clone(), who.clone(), role())
            .prop_map(|(actor, target, role)| Op::ChangeRole { actor, target, role }),
        2 => who.clone().prop_map(Op::Send),
        3 => (who.clone(), 0..8usize, any::<bool>())
            .prop_map(|(actor, message, pin)| Op::Pin { actor, message, pin }),
        1 => who.prop_map(Op::HostMute),
    ]
}

fn user(index: usize) -> UserId {
    UserId::new(USERS[index]).unwrap()
}

fn live_room(max_participants: Option<u32>) -> SessionRoom {
    let mut params = NewSession::titled("Property room");
    if let Some(max) = max_participants {
        params = params.with_capacity(max);
    }
    let session = Session::create(SessionId::new(), user(0), params, Timestamp::now()).unwrap();
    SessionRoom::new(session)
}

/// Applies `op`; returns whether it committed a change.
fn apply(room: &mut SessionRoom, op: &Op) -> bool {
    let now = Timestamp::now();
    let message_ids: Vec<MessageId> = room.messages().iter().map(|m| *m.id()).collect();

    let changed = |sequence: Option<u64>| sequence.is_some();
    match op {
        Op::Join(u) => room
            .join(&user(*u), ParticipantRole::Listener, now)
            .map(|a| changed(a.sequence())),
        Op::Leave(u) => room.leave(&user(*u), now).map(|a| changed(a.sequence())),
        Op::RaiseHand(u) => room.raise_hand(&user(*u)).map(|a| changed(a.sequence())),
        Op::ChangeRole {
            actor,
            target,
            role,
        } => room
            .change_role(&user(*actor), &user(*target), *role)
            .map(|a| changed(a.sequence())),
        Op::Send(u) => room
            .send_message(&user(*u), format!("from {}", USERS[*u]), now)
            .map(|a| changed(a.sequence())),
        Op::Pin {
            actor,
            message,
            pin,
        } => match message_ids.get(*message) {
            Some(id) => room
                .set_pinned(&user(*actor), id, *pin)
                .map(|a| changed(a.sequence())),
            None => Ok(false),
        },
        Op::HostMute(u) => room
            .mute_by_host(&user(0), &user(*u))
            .map(|a| changed(a.sequence())),
    }
    .unwrap_or(false)
}

fn assert_consistent(room: &SessionRoom, max_participants: Option<u32>) {
    assert!(room.pinned_count() <= 1, "more than one pinned message");

    if let Some(max) = max_participants {
        assert!(room.active_count() <= max as usize, "capacity exceeded");
    }

    for name in USERS {
        let u = UserId::new(*name).unwrap();
        let active_rows = room.history_of(&u).filter(|p| p.is_active()).count();
        assert!(active_rows <= 1, "{name} has {active_rows} active rows");
    }

    assert!(
        room.active_participant(&user(0)).is_none(),
        "host must never hold a participant row"
    );

    for p in room.active_participants() {
        if p.hand_raised() {
            assert_eq!(p.role(), ParticipantRole::Listener);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn invariants_hold_for_any_command_sequence(
        max in prop::option::of(1u32..4),
        ops in prop::collection::vec(op(), 1..60),
    ) {
        let mut room = live_room(max);
        let mut committed = 0u64;

        for op in &ops {
            let before = room.clone();
            if apply(&mut room, op) {
                committed += 1;
            } else {
                prop_assert_eq!(room.last_sequence(), before.last_sequence());
            }
            assert_consistent(&room, max);
        }

        prop_assert_eq!(room.last_sequence(), CREATED_SEQUENCE + committed);
    }

    #[test]
    fn pin_exclusivity_under_any_pin_order(
        pins in prop::collection::vec((0..6usize, any::<bool>()), 1..40),
    ) {
        let mut room = live_room(None);
        let host = user(0);
        let mut ids = Vec::new();
        for i in 0..6 {
            let applied = room.send_message(&host, format!("m{i}"), Timestamp::now()).unwrap();
            let message = match applied {
                Applied::Changed { value, .. } => value,
                Applied::Unchanged(value) => value,
            };
            ids.push(*message.id());
        }

        let mut expected: Option<MessageId> = None;
        for (index, pin) in pins {
            room.set_pinned(&host, &ids[index], pin).unwrap();
            if pin {
                expected = Some(ids[index]);
            } else if expected == Some(ids[index]) {
                expected = None;
            }
            prop_assert!(room.pinned_count() <= 1);
            prop_assert_eq!(room.pinned_message().map(|m| *m.id()), expected);
        }
    }
}
