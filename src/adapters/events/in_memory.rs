//! In-process event bus.
//!
//! `publish` records the envelope, then awaits every handler registered for
//! its type before returning. A single-process deployment wires the session
//! fan-out through it; tests read back what was published.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, SessionId};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

type HandlerMap = HashMap<String, Vec<Arc<dyn EventHandler>>>;

/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// SessionEventBridge::new_shared(channels).register(bus.as_ref());
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("participant.joined.v1"));
/// ```
#[derive(Default)]
pub struct InMemoryEventBus {
    handlers: RwLock<HandlerMap>,
    log: RwLock<Vec<EventEnvelope>>,
    unavailable: AtomicBool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, `publish` fails with `PublishError` and records nothing.
    pub fn set_failing(&self, failing: bool) {
        self.unavailable.store(failing, Ordering::SeqCst);
    }

    /// Everything published so far, oldest first.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.matching(|_| true)
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.matching(|e| e.event_type == event_type)
    }

    pub fn events_for_session(&self, session_id: &SessionId) -> Vec<EventEnvelope> {
        self.matching(|e| e.session_id().as_ref() == Some(session_id))
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.read_log(|log| log.iter().any(|e| e.event_type == event_type))
    }

    pub fn event_count(&self) -> usize {
        self.read_log(|log| log.len())
    }

    pub fn clear(&self) {
        self.log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn matching(&self, keep: impl Fn(&EventEnvelope) -> bool) -> Vec<EventEnvelope> {
        self.read_log(|log| log.iter().filter(|e| keep(*e)).cloned().collect())
    }

    fn read_log<T>(&self, f: impl FnOnce(&[EventEnvelope]) -> T) -> T {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        f(log.as_slice())
    }

    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }

    fn register(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::PublishError,
                format!("event bus unavailable, dropped {}", event.event_type),
            ));
        }

        self.log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        // Handler list is cloned so no lock is held across the awaits below.
        let mut failures = Vec::new();
        for handler in self.handlers_for(&event.event_type) {
            if let Err(e) = handler.handle(event.clone()).await {
                failures.push(format!("{}: {}", handler.name(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::PublishError,
                format!("handlers failed: {}", failures.join(", ")),
            ))
        }
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.register(event_type, handler);
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        for event_type in event_types {
            self.register(event_type, Arc::clone(&handler));
        }
    }
}
