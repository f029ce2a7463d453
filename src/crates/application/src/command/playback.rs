use std::sync::Arc;

use crate::broadcast::StateBroadcaster;
use crate::error::AppError;
use crate::event::event_bus::{CorrelationId, EventBus, EventEnvelope, EventId};
use crate::shared::{ChannelSync, PlaybackPolicy};
use chrono::Local;
use domain::catalog::CatalogStore;
use domain::lookup::MediaLookup;
use domain::queue::{Queue, QueueDomainEvent, QueueRepository};
use domain::queue_item::{QueueItem, SourceKind};
use domain::random_pool::RandomPoolSource;
use model::history::{HistoryEntry, HistoryLedgerRepository};
use rand::Rng;
use tokio::sync::Mutex;

/// Enqueue command.
#[derive(Debug)]
pub struct AddItemsCmd {
    /// Items appended to the tail in this exact order.
    pub items: Vec<QueueItem>,
    /// Suppress the automatic advance normally triggered when items land in
    /// a previously-empty queue with nothing playing.
    pub skip_auto_advance: bool,
}

/// Playback application service: owns the queue, the advancement state
/// machine and the play-history ledger.
pub struct PlaybackAppService<B: EventBus> {
    queue_repository: Arc<dyn QueueRepository>,
    ledger_repository: Arc<dyn HistoryLedgerRepository>,
    catalog: Arc<dyn CatalogStore>,
    media_lookup: Arc<dyn MediaLookup>,
    random_pool: Arc<dyn RandomPoolSource>,
    policy: Arc<dyn PlaybackPolicy>,
    channel_sync: Arc<dyn ChannelSync>,
    broadcaster: Arc<StateBroadcaster>,
    event_bus: Arc<B>,
    // One advance chain at a time: the pop-validate-commit sequence is a
    // critical section, otherwise two callers can commit two currents.
    advance_lock: Mutex<()>,
}

impl<B: EventBus> PlaybackAppService<B> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue_repository: Arc<dyn QueueRepository>,
        ledger_repository: Arc<dyn HistoryLedgerRepository>,
        catalog: Arc<dyn CatalogStore>,
        media_lookup: Arc<dyn MediaLookup>,
        random_pool: Arc<dyn RandomPoolSource>,
        policy: Arc<dyn PlaybackPolicy>,
        channel_sync: Arc<dyn ChannelSync>,
        broadcaster: Arc<StateBroadcaster>,
        event_bus: Arc<B>,
    ) -> Self {
        Self {
            queue_repository,
            ledger_repository,
            catalog,
            media_lookup,
            random_pool,
            policy,
            channel_sync,
            broadcaster,
            event_bus,
            advance_lock: Mutex::new(()),
        }
    }

    /// Appends items to the queue. When the queue was empty and nothing is
    /// playing, one advance is triggered so the queue never sits non-empty
    /// but stalled.
    pub async fn add_items(&self, cmd: AddItemsCmd) -> Result<(), AppError> {
        if cmd.items.is_empty() {
            return Ok(());
        }

        let correlation = CorrelationId::new();
        let mut queue = self.queue_repository.load().await?;
        let was_empty = !queue.has_items();
        let had_current = queue.has_current();

        queue.enqueue(cmd.items);
        self.queue_repository.save(&mut queue).await?;
        self.publish_events(&mut queue, &correlation).await;

        if was_empty && !had_current && !cmd.skip_auto_advance {
            self.advance().await?;
        }

        Ok(())
    }

    /// Selects and commits the next item to play.
    ///
    /// Selection order: queue head, then (when configured) a bulk refill
    /// from one random grouping, then a single random draw. Every candidate
    /// passes the validity gate; rejected candidates are discarded and
    /// selection restarts, bounded by `max_advance_attempts`.
    pub async fn advance(&self) -> Result<QueueItem, AppError> {
        let _guard = self.advance_lock.lock().await;
        let correlation = CorrelationId::new();

        let max_attempts = self.policy.max_advance_attempts().max(1);
        for attempt in 1..=max_attempts {
            let Some(candidate) = self.next_candidate(&correlation).await? else {
                return Err(AppError::ExhaustedFallback);
            };

            match self.gate_candidate(candidate).await {
                Some(item) => return self.commit_current(item, &correlation).await,
                None => {
                    log::debug!("advance: candidate rejected, attempt {attempt}/{max_attempts}");
                }
            }
        }

        log::warn!("advance: gave up after {max_attempts} rejected candidates");
        Err(AppError::ExhaustedFallback)
    }

    pub async fn current_item(&self) -> Result<Option<QueueItem>, AppError> {
        Ok(self.queue_repository.load().await?.current)
    }

    /// The current item, advancing once when nothing is playing and a
    /// random fallback is enabled. `None` when idle with fallbacks off.
    pub async fn current_or_advance(&self) -> Result<Option<QueueItem>, AppError> {
        if let Some(current) = self.current_item().await? {
            return Ok(Some(current));
        }
        if self.policy.use_random_playlist() || self.policy.use_entire_random_playlist() {
            return Ok(Some(self.advance().await?));
        }
        Ok(None)
    }

    /// One selection pass over the queue and the fallback chain.
    async fn next_candidate(
        &self,
        correlation: &CorrelationId,
    ) -> Result<Option<QueueItem>, AppError> {
        if let Some(item) = self.pop_head(correlation).await? {
            return Ok(Some(item));
        }

        if self.policy.use_entire_random_playlist() {
            match self.refill_from_random_grouping(correlation).await {
                Ok(added) if added > 0 => {
                    if let Some(item) = self.pop_head(correlation).await? {
                        return Ok(Some(item));
                    }
                }
                Ok(_) => log::warn!("advance: random grouping refill produced no items"),
                Err(e) => log::error!("advance: failed to refill from random grouping: {e}"),
            }
        }

        if self.policy.use_random_playlist() {
            if let Some(item) = self.random_pool.draw_random(1).await?.into_iter().next() {
                return Ok(Some(item));
            }
        }

        if !self.policy.use_entire_random_playlist() && !self.policy.use_random_playlist() {
            log::warn!("advance: queue empty and no random fallback configured");
        }
        Ok(None)
    }

    /// Pops the queue head, persisting the removal before returning it.
    async fn pop_head(&self, correlation: &CorrelationId) -> Result<Option<QueueItem>, AppError> {
        let mut queue = self.queue_repository.load().await?;
        let Some(item) = queue.dequeue() else {
            return Ok(None);
        };
        self.queue_repository.save(&mut queue).await?;
        self.publish_events(&mut queue, correlation).await;
        Ok(Some(item))
    }

    /// Enqueues the complete member list of one randomly chosen grouping,
    /// preserving catalog order. Returns how many items were added.
    async fn refill_from_random_grouping(
        &self,
        correlation: &CorrelationId,
    ) -> Result<usize, AppError> {
        let groupings = self.catalog.list_groupings().await?;
        if groupings.is_empty() {
            return Ok(0);
        }
        let pick = &groupings[rand::thread_rng().gen_range(0..groupings.len())];

        let members = self.catalog.members_of(&pick.id).await?;
        if members.is_empty() {
            return Ok(0);
        }
        let count = members.len();

        let mut queue = self.queue_repository.load().await?;
        queue.enqueue(members);
        self.queue_repository.save(&mut queue).await?;
        self.publish_events(&mut queue, correlation).await;
        Ok(count)
    }

    /// Validity gate. Returns the (possibly duration-enriched) item when it
    /// may become current, `None` when it must be discarded. Lookup errors
    /// count as failed checks: the candidate is dropped, never retried.
    async fn gate_candidate(&self, mut item: QueueItem) -> Option<QueueItem> {
        if item.is_malformed() {
            log::warn!("advance: discarding malformed candidate without an id");
            return None;
        }

        match item.source {
            // Catalog-hosted media is our own; nothing external to check.
            SourceKind::CatalogHosted => {}
            SourceKind::ExternallyHosted => {
                match self.media_lookup.is_age_restricted(&item.id).await {
                    Ok(false) => {}
                    Ok(true) => {
                        log::info!("advance: skipping age-restricted item {}", item.id);
                        return None;
                    }
                    Err(e) => {
                        log::warn!("advance: age-restriction lookup failed, discarding: {e}");
                        return None;
                    }
                }

                if item.duration_secs == 0 {
                    match self.catalog.resolve_duration(&item.id).await {
                        Ok(secs) => item.duration_secs = secs,
                        Err(e) => {
                            log::warn!(
                                "advance: duration resolution failed for {}, discarding: {e}",
                                item.id
                            );
                            return None;
                        }
                    }
                }
            }
        }

        Some(item)
    }

    /// Commits an accepted candidate: persist as current, record in the
    /// ledger, fire the channel-sync side effect and notify observers.
    async fn commit_current(
        &self,
        item: QueueItem,
        correlation: &CorrelationId,
    ) -> Result<QueueItem, AppError> {
        let mut queue = self.queue_repository.load().await?;
        queue.set_current(item.clone());
        self.queue_repository.save(&mut queue).await?;

        let entry = HistoryEntry {
            item: item.clone(),
            played_at: Local::now().naive_local(),
        };
        self.ledger_repository
            .add_first(&entry, self.policy.history_cap())
            .await?;

        // Snapshots broadcast from here include the fresh ledger head.
        self.publish_events(&mut queue, correlation).await;

        if let Err(e) = self
            .channel_sync
            .now_playing_changed(&item.title, &item.grouping.id)
            .await
        {
            log::error!("Failed to sync channel information: {e}");
        }

        self.broadcaster.announce_next_item().await;
        Ok(item)
    }

    /// Events leave the aggregate only after the durable write committed.
    async fn publish_events(&self, queue: &mut Queue, correlation: &CorrelationId) {
        for event in queue.take_pending_events() {
            let envelope = EventEnvelope::<QueueDomainEvent>::from_domain_event(
                event,
                correlation.clone(),
                EventId::new(),
            );
            self.event_bus.publish(envelope).await;
        }
    }
}
