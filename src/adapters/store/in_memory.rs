//! In-memory session store.
//!
//! Each room sits behind its own `tokio::sync::Mutex`, so commands on one
//! session queue up while other sessions proceed. The outer map lock is held
//! only long enough to find the room. Mutations run on the stored room in
//! place; nothing is copied per command.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::domain::room::{RoomError, SessionRoom};
use crate::ports::{RoomMutation, SessionStore};

type RoomSlot = Arc<Mutex<SessionRoom>>;

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    rooms: Arc<RwLock<HashMap<SessionId, RoomSlot>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove everything (tests).
    pub async fn clear(&self) {
        self.rooms.write().await.clear();
    }

    async fn slot(&self, id: &SessionId) -> Option<RoomSlot> {
        self.rooms.read().await.get(id).cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, room: SessionRoom) -> Result<(), DomainError> {
        let mut rooms = self.rooms.write().await;
        let id = *room.id();
        if rooms.contains_key(&id) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Session {} already exists", id),
            ));
        }
        rooms.insert(id, Arc::new(Mutex::new(room)));
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionRoom>, DomainError> {
        let Some(slot) = self.slot(id).await else {
            return Ok(None);
        };
        let room = slot.lock().await;
        if room.is_deleted() {
            return Ok(None);
        }
        Ok(Some(room.clone()))
    }

    async fn with_session_lock<'a>(
        &'a self,
        id: &SessionId,
        mutation: RoomMutation<'a>,
    ) -> Result<(), RoomError> {
        let slot = self
            .slot(id)
            .await
            .ok_or(RoomError::SessionNotFound(*id))?;

        let mut room = slot.lock().await;
        // A waiter may get the lock after the room was deleted under it.
        if room.is_deleted() {
            return Err(RoomError::SessionNotFound(*id));
        }

        let after_commit = mutation(&mut *room)?;
        let deleted = room.is_deleted();
        after_commit.await;
        drop(room);

        if deleted {
            self.rooms.write().await.remove(id);
            tracing::debug!(session_id = %id, "session removed from store");
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.rooms.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::participant::ParticipantRole;
    use crate::domain::session::{NewSession, Session};
    use crate::ports::with_room;
    use futures::FutureExt;

    fn host() -> UserId {
        UserId::new("host").unwrap()
    }

    fn room(new: NewSession) -> SessionRoom {
        let session = Session::create(SessionId::new(), host(), new, Timestamp::now()).unwrap();
        SessionRoom::new(session)
    }

    #[tokio::test]
    async fn insert_then_load() {
        let store = InMemorySessionStore::new();
        let room = room(NewSession::titled("Talk"));
        let id = *room.id();

        store.insert(room).await.unwrap();

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.session().title(), "Talk");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = InMemorySessionStore::new();
        let room = room(NewSession::titled("Talk"));

        store.insert(room.clone()).await.unwrap();
        let err = store.insert(room).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();

        assert!(store.load(&id).await.unwrap().is_none());
        let err = with_room(&store, &id, |_| Ok(())).await.unwrap_err();
        assert_eq!(err, RoomError::SessionNotFound(id));
    }

    #[tokio::test]
    async fn rejected_command_leaves_room_untouched() {
        let store = InMemorySessionStore::new();
        let room = room(NewSession::titled("Talk").with_capacity(1));
        let id = *room.id();
        store.insert(room).await.unwrap();

        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();
        with_room(&store, &id, |room| {
            room.join(&alice, ParticipantRole::Listener, Timestamp::now())
        })
        .await
        .unwrap();
        let before = store.load(&id).await.unwrap().unwrap();

        let err = with_room(&store, &id, |room| {
            room.join(&bob, ParticipantRole::Listener, Timestamp::now())
        })
        .await
        .unwrap_err();

        assert_eq!(err, RoomError::CapacityExceeded { max: 1 });
        assert_eq!(store.load(&id).await.unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn after_commit_work_finishes_before_the_next_command() {
        let store = Arc::new(InMemorySessionStore::new());
        let room = room(NewSession::titled("Talk"));
        let id = *room.id();
        store.insert(room).await.unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let (store, log) = (store.clone(), log.clone());
            tokio::spawn(async move {
                store
                    .with_session_lock(
                        &id,
                        Box::new(move |_room: &mut SessionRoom| {
                            Ok(async move {
                                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                                log.lock().await.push("first");
                            }
                            .boxed())
                        }),
                    )
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        with_room(store.as_ref(), &id, |_| Ok(()))
            .await
            .unwrap();
        log.lock().await.push("second");

        first.await.unwrap().unwrap();
        assert_eq!(*log.lock().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn successful_mutation_commits_and_returns_output() {
        let store = InMemorySessionStore::new();
        let room = room(NewSession::titled("Talk"));
        let id = *room.id();
        store.insert(room).await.unwrap();

        let alice = UserId::new("alice").unwrap();
        let sequence = with_room(&store, &id, |room| {
            let applied = room.join(&alice, ParticipantRole::Listener, Timestamp::now())?;
            Ok(applied.sequence())
        })
        .await
        .unwrap();

        assert_eq!(sequence, Some(2));
        assert_eq!(store.load(&id).await.unwrap().unwrap().active_count(), 1);
    }

    #[tokio::test]
    async fn deleted_room_is_removed() {
        let store = InMemorySessionStore::new();
        let room = room(NewSession::titled("Later").scheduled_for(Timestamp::now().plus_minutes(30)));
        let id = *room.id();
        store.insert(room).await.unwrap();

        with_room(&store, &id, |room| room.delete_session(&host()))
            .await
            .unwrap();

        assert!(store.load(&id).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
        let err = with_room(&store, &id, |_| Ok(())).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mutations_on_one_session_are_serialized() {
        let store = Arc::new(InMemorySessionStore::new());
        let room = room(NewSession::titled("Busy"));
        let id = *room.id();
        store.insert(room).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let user = UserId::new(format!("user-{i}")).unwrap();
                with_room(store.as_ref(), &id, |room| {
                    room.join(&user, ParticipantRole::Listener, Timestamp::now())
                })
                .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.active_count(), 32);
        assert_eq!(loaded.last_sequence(), 33);
    }
}
