use domain::value::GroupingId;
use model::snapshot::QueueHistorySnapshot;

/// Runtime playback policy. Backed by the runtime-updatable configuration;
/// the dashboard can flip the fallback switches while the engine runs.
pub trait PlaybackPolicy: Send + Sync {
    /// Fallback tier (a): refill the queue with one random grouping's
    /// complete member list.
    fn use_entire_random_playlist(&self) -> bool;
    /// Fallback tier (b): draw a single item from the random pool.
    fn use_random_playlist(&self) -> bool;
    /// Upper bound on candidates considered per `advance` call.
    fn max_advance_attempts(&self) -> usize;
    /// Quality cap handed to players for externally-hosted items.
    fn max_quality(&self) -> u32;
    /// History ledger length cap; 0 disables truncation.
    fn history_cap(&self) -> usize;
}

/// Events pushed through the live-update transport. The transport itself
/// (sockets, SSE, ...) is outside the engine; this is its publish surface.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Full queue + history state, sent after every queue mutation.
    QueueHistoryUpdate(QueueHistorySnapshot),
    /// A new item was committed as current.
    NextItem,
    /// Relay of a client progress report to dashboards.
    DashboardUpdate { elapsed_secs: f64, duration_secs: f64 },
    /// A controller scrubbed to a new position.
    SetPosition { elapsed_secs: f64 },
    /// A controller skipped the current item.
    Skip,
    /// Play/pause state relay.
    PlayingStateChanged { is_playing: bool },
    /// Single-target reply to a "where are we" pull request.
    PositionReport { elapsed_secs: f64, duration_secs: f64 },
}

/// Fire-and-forget publish primitive. Delivery is best-effort and unordered
/// across observers; there is no acknowledgment and no retry.
#[async_trait::async_trait]
pub trait PublishChannel: Send + Sync {
    async fn broadcast(&self, event: ChannelEvent);
    /// Single-target variant used for reply-style messages.
    async fn emit_to(&self, target: &str, event: ChannelEvent);
}

/// Downstream side effect tied to "now playing changed" (channel/title
/// sync). Failures are logged by callers and never abort an advance.
#[async_trait::async_trait]
pub trait ChannelSync: Send + Sync {
    async fn now_playing_changed(&self, title: &str, grouping_id: &GroupingId)
        -> anyhow::Result<()>;
}
