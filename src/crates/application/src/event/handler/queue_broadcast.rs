use crate::broadcast::StateBroadcaster;
use crate::event::event_bus::{EventEnvelope, Handler};
use async_trait::async_trait;
use domain::queue::QueueDomainEvent;
use std::sync::Arc;

/// Pushes a full {queue, history} snapshot to observers after every queue
/// mutation. The snapshot is rebuilt from storage, so observers only ever
/// see state that is already durable.
pub struct QueueBroadcastHandler {
    broadcaster: Arc<StateBroadcaster>,
}

impl QueueBroadcastHandler {
    pub fn new(broadcaster: Arc<StateBroadcaster>) -> Self {
        Self { broadcaster }
    }
}

#[async_trait]
impl Handler<QueueDomainEvent> for QueueBroadcastHandler {
    async fn handle(&self, _event: &EventEnvelope<QueueDomainEvent>) {
        self.broadcaster.broadcast_queue_history().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_bus::{CorrelationId, EventId};
    use crate::shared::{ChannelEvent, PublishChannel};
    use domain::queue::{Queue, QueueError, QueueEventKind, QueueRepository};
    use domain::queue_item::{GroupingRef, QueueItem, SourceKind};
    use domain::value::ItemId;
    use model::history::{HistoryEntry, HistoryLedgerRepository};
    use model::ModelError;
    use std::sync::Mutex;

    struct FixedQueueRepository(Queue);

    #[async_trait]
    impl QueueRepository for FixedQueueRepository {
        async fn load(&self) -> Result<Queue, QueueError> {
            Ok(self.0.clone())
        }
        async fn save(&self, _queue: &mut Queue) -> Result<(), QueueError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct EmptyLedger;

    #[async_trait]
    impl HistoryLedgerRepository for EmptyLedger {
        async fn add_first(&self, _entry: &HistoryEntry, _cap: usize) -> Result<(), ModelError> {
            Ok(())
        }
        async fn list(&self) -> Result<Vec<HistoryEntry>, ModelError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct RecordingPublish {
        events: Mutex<Vec<ChannelEvent>>,
    }

    #[async_trait]
    impl PublishChannel for RecordingPublish {
        async fn broadcast(&self, event: ChannelEvent) {
            self.events.lock().unwrap().push(event);
        }
        async fn emit_to(&self, _target: &str, event: ChannelEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn test_handler_broadcasts_full_snapshot() {
        let mut queue = Queue::new();
        queue.enqueue(vec![QueueItem {
            id: ItemId::from("a"),
            source: SourceKind::CatalogHosted,
            title: "a".to_string(),
            thumbnail_url: String::new(),
            duration_secs: 10,
            grouping: GroupingRef::default(),
        }]);
        queue.take_pending_events();

        let publish = Arc::new(RecordingPublish::default());
        let broadcaster = Arc::new(StateBroadcaster::new(
            publish.clone(),
            Arc::new(FixedQueueRepository(queue)),
            Arc::new(EmptyLedger),
        ));
        let handler = QueueBroadcastHandler::new(broadcaster);

        let event = QueueDomainEvent {
            kind: QueueEventKind::ItemDequeued {
                item_id: ItemId::from("a"),
            },
        };
        let envelope = EventEnvelope::<QueueDomainEvent>::from_domain_event(
            event,
            CorrelationId::new(),
            EventId::new(),
        );
        handler.handle(&envelope).await;

        let events = publish.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ChannelEvent::QueueHistoryUpdate(snapshot) => {
                assert_eq!(snapshot.queue.pending.len(), 1);
                assert!(snapshot.history.is_empty());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
