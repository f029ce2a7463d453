use super::queue_broadcast::QueueBroadcastHandler;
use crate::broadcast::StateBroadcaster;
use crate::event::event_bus::EventBus;
use std::sync::Arc;

/// Wires every engine-side event handler into the bus. Called once at
/// startup, after the repositories and the broadcaster exist.
pub async fn register_handlers<B: EventBus + Clone + 'static>(
    bus: &mut B,
    broadcaster: Arc<StateBroadcaster>,
) {
    let queue_broadcast_handler = QueueBroadcastHandler::new(broadcaster);

    bus.subscribe::<domain::queue::QueueDomainEvent>(Arc::new(queue_broadcast_handler))
        .await;
}
