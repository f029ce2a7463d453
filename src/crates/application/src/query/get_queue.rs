use crate::error::AppError;
use domain::queue::QueueRepository;
use model::snapshot::QueueSnapshot;
use std::sync::Arc;

#[derive(Clone)]
pub struct GetQueueSnapshot {
    queue_repository: Arc<dyn QueueRepository>,
}

impl GetQueueSnapshot {
    pub fn new(queue_repository: Arc<dyn QueueRepository>) -> Self {
        Self { queue_repository }
    }

    pub async fn handle(&self) -> Result<QueueSnapshot, AppError> {
        let queue = self.queue_repository.load().await?;
        Ok(QueueSnapshot::from(&queue))
    }
}
