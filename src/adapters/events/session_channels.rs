//! Per-session ordered fan-out.
//!
//! Each session gets one broadcast channel, opened by its `session.created`
//! event and retired by the event that ends it (`session.ended`,
//! `session.cancelled` or `session.deleted`). Handlers publish while they still
//! hold the session lock, so envelopes arrive here in commit order:
//!
//! ```text
//! deliver(seq)
//!    │
//!    ├─ no open channel     → dropped
//!    ├─ seq < next          → duplicate, dropped
//!    ├─ seq > next          → earlier publishes were lost: warn, broadcast
//!    └─ seq == next         → broadcast
//! ```
//!
//! A lost publish never holds later events back.

use std::collections::HashMap;

use futures::stream::{self, Stream};
use tokio::sync::{broadcast, RwLock};

use crate::config::EventsConfig;
use crate::domain::foundation::{EventEnvelope, SessionId, UserId};
use crate::domain::room::CREATED_SEQUENCE;

/// Opens a session's channel.
const SESSION_CREATED: &str = "session.created";

/// Event types after which a session emits nothing its subscribers need.
const CLOSING_EVENTS: &[&str] = &["session.ended", "session.cancelled", "session.deleted"];

/// Event type routed only to its recipient by [`SessionChannels::subscribe_for`].
const SIGNAL_RELAYED: &str = "signal.relayed";

/// What happened to a delivered envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Broadcast in order.
    Released,
    /// Broadcast after skipping this many sequence numbers that never arrived.
    ReleasedAfterGap { missing: u64 },
    /// Sequence already delivered.
    Duplicate,
    /// The session has no open channel (never created here, or already closed).
    Closed,
    /// Aggregate id is not a session id.
    Unroutable,
}

struct SessionChannel {
    sender: broadcast::Sender<EventEnvelope>,
    next_sequence: u64,
}

impl SessionChannel {
    fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            next_sequence: CREATED_SEQUENCE,
        }
    }

    fn release(&mut self, envelope: EventEnvelope) {
        self.next_sequence = envelope.sequence + 1;
        // No receivers is fine; nobody is listening yet.
        let _ = self.sender.send(envelope);
    }
}

/// Ordered per-session broadcast hub.
///
/// # Thread Safety
///
/// Channels live behind a `RwLock`; `deliver` takes the write side so the
/// ordering state of a session is updated by one caller at a time.
pub struct SessionChannels {
    channels: RwLock<HashMap<SessionId, SessionChannel>>,
    channel_capacity: usize,
}

impl SessionChannels {
    /// `channel_capacity` is the buffer per session; slow subscribers beyond
    /// it lag.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    /// Receiver for every envelope of the session released from now on, or
    /// `None` if the session has no open channel.
    pub async fn subscribe(
        &self,
        session_id: &SessionId,
    ) -> Option<broadcast::Receiver<EventEnvelope>> {
        self.channels
            .read()
            .await
            .get(session_id)
            .map(|channel| channel.sender.subscribe())
    }

    /// Stream view of [`subscribe`](Self::subscribe) for one user.
    ///
    /// Signals addressed to someone else are filtered out. A subscriber that
    /// falls behind skips what it missed and keeps going. The stream ends
    /// when the session's channel is retired.
    pub async fn subscribe_for(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Option<impl Stream<Item = EventEnvelope> + Send + 'static> {
        let receiver = self.subscribe(session_id).await?;
        let user_id = user_id.clone();

        Some(stream::unfold(receiver, move |mut receiver| {
            let user_id = user_id.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(envelope) if addressed_to(&envelope, &user_id) => {
                            return Some((envelope, receiver))
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                user_id = %user_id,
                                skipped,
                                "subscriber lagged, events skipped"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        }))
    }

    /// Route one envelope into its session's ordered stream.
    pub async fn deliver(&self, envelope: EventEnvelope) -> Delivery {
        let Some(session_id) = envelope.session_id() else {
            tracing::warn!(
                aggregate_id = %envelope.aggregate_id,
                event_type = %envelope.event_type,
                "envelope has no session id, not routed"
            );
            return Delivery::Unroutable;
        };

        let mut channels = self.channels.write().await;
        if envelope.base_type() == SESSION_CREATED {
            channels
                .entry(session_id)
                .or_insert_with(|| SessionChannel::new(self.channel_capacity));
        }
        let Some(channel) = channels.get_mut(&session_id) else {
            tracing::debug!(
                session_id = %session_id,
                event_type = %envelope.event_type,
                "no open channel, event dropped"
            );
            return Delivery::Closed;
        };

        let sequence = envelope.sequence;
        let next = channel.next_sequence;
        if sequence < next {
            tracing::debug!(
                session_id = %session_id,
                sequence,
                next,
                "duplicate event dropped"
            );
            return Delivery::Duplicate;
        }

        let delivery = if sequence > next {
            tracing::warn!(
                session_id = %session_id,
                missing_from = next,
                missing_to = sequence - 1,
                "events lost before fan-out, skipping gap"
            );
            Delivery::ReleasedAfterGap {
                missing: sequence - next,
            }
        } else {
            Delivery::Released
        };

        let closing = CLOSING_EVENTS
            .iter()
            .any(|closing| *closing == envelope.base_type());
        channel.release(envelope);
        if closing {
            channels.remove(&session_id);
            tracing::debug!(session_id = %session_id, "session channel retired");
        }

        delivery
    }

    /// Drops a session's channel. Subscribers see the end of their stream.
    pub async fn close(&self, session_id: &SessionId) {
        self.channels.write().await.remove(session_id);
    }

    pub async fn subscriber_count(&self, session_id: &SessionId) -> usize {
        self.channels
            .read()
            .await
            .get(session_id)
            .map(|c| c.sender.receiver_count())
            .unwrap_or(0)
    }

    /// Sessions with an open channel.
    pub async fn active_sessions(&self) -> Vec<SessionId> {
        self.channels.read().await.keys().copied().collect()
    }

    /// Next sequence an open channel expects.
    pub async fn next_sequence(&self, session_id: &SessionId) -> Option<u64> {
        self.channels
            .read()
            .await
            .get(session_id)
            .map(|c| c.next_sequence)
    }
}

impl Default for SessionChannels {
    fn default() -> Self {
        Self::from_config(&EventsConfig::default())
    }
}

/// Signals go to their recipient only; everything else goes to everyone.
fn addressed_to(envelope: &EventEnvelope, user_id: &UserId) -> bool {
    if envelope.base_type() != SIGNAL_RELAYED {
        return true;
    }
    envelope
        .payload
        .get("recipient_id")
        .and_then(|r| r.as_str())
        .map_or(false, |recipient| recipient == user_id.as_str())
}
