use crate::error::AppError;
use crate::shared::{ChannelEvent, PublishChannel};
use domain::queue::QueueRepository;
use model::history::HistoryLedgerRepository;
use model::snapshot::{HistoryView, QueueHistorySnapshot, QueueSnapshot};
use std::sync::Arc;
use std::sync::RwLock;

/// Playback position shared between all connected clients: elapsed seconds
/// into the current item and the duration the players have reported. Owned
/// by the broadcaster, created with the engine, reset on every advance.
#[derive(Debug, Default)]
pub struct PlaybackState {
    elapsed_secs: RwLock<f64>,
    duration_secs: RwLock<f64>,
}

impl PlaybackState {
    pub fn elapsed_secs(&self) -> f64 {
        *self.elapsed_secs.read().unwrap()
    }

    pub fn duration_secs(&self) -> f64 {
        *self.duration_secs.read().unwrap()
    }

    pub fn set_elapsed(&self, secs: f64) {
        *self.elapsed_secs.write().unwrap() = secs;
    }

    pub fn set_duration(&self, secs: f64) {
        *self.duration_secs.write().unwrap() = secs;
    }

    pub fn reset(&self) {
        *self.elapsed_secs.write().unwrap() = 0.0;
        *self.duration_secs.write().unwrap() = 0.0;
    }
}

/// Fans playback state out to every observer. Queue/history snapshots go
/// through the publish channel after each mutation; position updates are
/// relayed as they arrive from clients.
pub struct StateBroadcaster {
    publish: Arc<dyn PublishChannel>,
    queue_repo: Arc<dyn QueueRepository>,
    ledger_repo: Arc<dyn HistoryLedgerRepository>,
    state: PlaybackState,
}

impl StateBroadcaster {
    pub fn new(
        publish: Arc<dyn PublishChannel>,
        queue_repo: Arc<dyn QueueRepository>,
        ledger_repo: Arc<dyn HistoryLedgerRepository>,
    ) -> Self {
        Self {
            publish,
            queue_repo,
            ledger_repo,
            state: PlaybackState::default(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Pushes the full {queue, history} state to every observer. Best
    /// effort: a failed load is logged and the update dropped; the next
    /// mutation re-broadcasts complete state anyway.
    pub async fn broadcast_queue_history(&self) {
        match self.load_snapshot().await {
            Ok(snapshot) => {
                self.publish
                    .broadcast(ChannelEvent::QueueHistoryUpdate(snapshot))
                    .await;
            }
            Err(e) => {
                log::error!("Failed to build queue/history snapshot for broadcast: {e}");
            }
        }
    }

    async fn load_snapshot(&self) -> Result<QueueHistorySnapshot, AppError> {
        let queue = self.queue_repo.load().await?;
        let history = self.ledger_repo.list().await?;
        Ok(QueueHistorySnapshot {
            queue: QueueSnapshot::from(&queue),
            history: history.iter().map(HistoryView::from).collect(),
        })
    }

    /// Signals that a new item was committed as current.
    pub async fn announce_next_item(&self) {
        self.state.reset();
        self.publish.broadcast(ChannelEvent::NextItem).await;
    }

    /// A player reported progress; remember it and relay to dashboards.
    pub async fn report_progress(&self, elapsed_secs: f64, duration_secs: f64) {
        self.state.set_elapsed(elapsed_secs);
        self.state.set_duration(duration_secs);
        self.publish
            .broadcast(ChannelEvent::DashboardUpdate {
                elapsed_secs,
                duration_secs,
            })
            .await;
    }

    /// A controller scrubbed to a new position.
    pub async fn seek(&self, elapsed_secs: f64) {
        self.state.set_elapsed(elapsed_secs);
        self.publish
            .broadcast(ChannelEvent::SetPosition { elapsed_secs })
            .await;
    }

    /// A controller skipped the current item.
    pub async fn skip(&self) {
        self.state.reset();
        self.publish.broadcast(ChannelEvent::Skip).await;
    }

    pub async fn set_playing_state(&self, is_playing: bool) {
        self.publish
            .broadcast(ChannelEvent::PlayingStateChanged { is_playing })
            .await;
    }

    /// Single-target reply carrying the known position and duration.
    pub async fn send_position_report(&self, target: &str) {
        self.publish
            .emit_to(
                target,
                ChannelEvent::PositionReport {
                    elapsed_secs: self.state.elapsed_secs(),
                    duration_secs: self.state.duration_secs(),
                },
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_both_fields() {
        let state = PlaybackState::default();
        state.set_elapsed(42.5);
        state.set_duration(120.0);
        state.reset();
        assert_eq!(state.elapsed_secs(), 0.0);
        assert_eq!(state.duration_secs(), 0.0);
    }
}
