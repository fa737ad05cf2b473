//! EventSubscriber port - Interface for subscribing to domain events.
//!
//! Handlers register interest in event types without knowing how events are
//! transported.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Implementations should be:
/// - **Idempotent** - Delivery is at-least-once
/// - **Quick** - Publishing waits for handlers to return
/// - **Isolated** - One handler's error does not stop the others
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events.
///
/// # Example
///
/// ```ignore
/// subscriber.subscribe("session.started.v1", bridge.clone());
/// subscriber.subscribe_all(&["message.sent.v1", "signal.relayed.v1"], bridge);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to multiple event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
