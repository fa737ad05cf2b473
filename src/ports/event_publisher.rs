//! EventPublisher port - Interface for publishing domain events.
//!
//! The domain publishes one envelope per accepted mutation without knowing
//! which transport carries it to subscribers.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (subscribers may see duplicates)
/// - Events of one session reach subscribers in `sequence` order
/// - Errors are propagated to the caller
///
/// # Example
///
/// ```ignore
/// let envelope = SessionStarted { .. }.to_envelope(sequence)?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    ///
    /// The envelope carries the session id (`aggregate_id`), the session
    /// sequence number, the event type and the opaque payload.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Adapters without atomic batches publish sequentially and stop at the
    /// first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
