//! Session store port.
//!
//! The store is the only shared mutable resource in the system. Every command
//! runs inside [`SessionStore::with_session_lock`], which gives the mutation
//! exclusive access to one session's room for the duration of the call.
//!
//! # Contract
//!
//! - Mutations on the same session are serialized; different sessions do not
//!   contend.
//! - The mutation works on the stored room in place. It must not change the
//!   room when it returns `Err`; [`SessionRoom`]'s own methods already hold
//!   to this.
//! - The [`AfterCommit`] future a mutation returns runs before the lock is
//!   released. Events published there reach subscribers in commit order.
//! - A mutation that leaves the room marked deleted removes it from the store
//!   on commit. Later calls see `SessionNotFound`.

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::room::{RoomError, SessionRoom};

/// Work that must finish while the session is still locked.
pub type AfterCommit<'a> = BoxFuture<'a, ()>;

/// Boxed mutation run under a session lock.
pub type RoomMutation<'a> =
    Box<dyn FnOnce(&mut SessionRoom) -> Result<AfterCommit<'a>, RoomError> + Send + 'a>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a newly created room.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a room with the same id already exists
    async fn insert(&self, room: SessionRoom) -> Result<(), DomainError>;

    /// Snapshot of a room, or `None` if absent or deleted.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRoom>, DomainError>;

    /// Run `mutation` with exclusive access to the room, then await the
    /// future it returned before releasing the lock.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session does not exist or was deleted
    /// - whatever `mutation` returns
    async fn with_session_lock<'a>(
        &'a self,
        id: &SessionId,
        mutation: RoomMutation<'a>,
    ) -> Result<(), RoomError>;

    /// Number of rooms currently stored.
    async fn count(&self) -> Result<usize, DomainError>;
}

/// Runs `f` under the session lock and hands back its output.
///
/// Generic companion to the object-safe [`SessionStore::with_session_lock`].
pub async fn with_room<T, F>(store: &dyn SessionStore, id: &SessionId, f: F) -> Result<T, RoomError>
where
    T: Send,
    F: FnOnce(&mut SessionRoom) -> Result<T, RoomError> + Send,
{
    let mut output = None;
    store
        .with_session_lock(
            id,
            Box::new(|room: &mut SessionRoom| {
                output = Some(f(room)?);
                Ok(future::ready(()).boxed())
            }),
        )
        .await?;
    output.ok_or_else(|| RoomError::infrastructure("session lock returned without running"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }
}
