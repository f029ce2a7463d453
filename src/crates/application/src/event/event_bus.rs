use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::event::DomainEvent;
use std::any::Any;
use std::sync::Arc;
use uuid::Uuid;

/// Event envelope carrying common metadata around a domain event payload.
#[derive(Debug, Clone)]
pub struct EventEnvelope<T> {
    pub id: EventId,
    pub aggregate_id: String,
    pub version: i64,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
    // correlation_id traces a request across events
    pub correlation_id: CorrelationId,
    // causation_id is the event id of the event that caused this one
    pub causation_id: EventId,
}

impl<T> EventEnvelope<T> {
    pub fn from_domain_event<E: DomainEvent>(
        event: E,
        correlation_id: CorrelationId,
        causation_id: EventId,
    ) -> EventEnvelope<E> {
        EventEnvelope {
            id: EventId::new(),
            aggregate_id: event.aggregate_id(),
            version: event.version(),
            timestamp: Utc::now(),
            payload: event,
            correlation_id,
            causation_id,
        }
    }
}

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Strongly-typed handler for one event type.
#[async_trait]
pub trait Handler<E>: Send + Sync {
    async fn handle(&self, event: &EventEnvelope<E>);
}

/// Type-erased handler; dispatch downcasts through `Any`.
#[async_trait]
pub trait ErasedHandler: Send + Sync {
    async fn handle_erased(&self, event: &(dyn Any + Send + Sync));
}

/// In-process event bus abstraction.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish<E>(&self, event: EventEnvelope<E>)
    where
        E: Send + Sync + 'static;

    async fn subscribe<E>(&mut self, handler: Arc<dyn Handler<E>>)
    where
        E: Send + Sync + 'static;
}
