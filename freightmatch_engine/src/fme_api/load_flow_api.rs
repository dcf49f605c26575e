use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Load, NewLoad},
    events::{EventProducers, LoadPublishedEvent},
    fme_api::{market_objects::UpdateLoadRequest, MatchingApi},
    traits::{MarketplaceDatabase, MarketplaceError},
};

/// `LoadFlowApi` is the shipper-facing entry point for the load lifecycle: draft, publish, edit, close bidding,
/// cancel and delete. Publishing also drives the saved-search matching fan-out.
pub struct LoadFlowApi<B> {
    db: B,
    producers: EventProducers,
    matcher: MatchingApi<B>,
}

impl<B> Debug for LoadFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoadFlowApi")
    }
}

impl<B: Clone> LoadFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        let matcher = MatchingApi::new(db.clone(), producers.clone());
        Self { db, producers, matcher }
    }
}

impl<B> LoadFlowApi<B>
where B: MarketplaceDatabase
{
    /// Creates a new load in `Draft` status. Drafts are private to their owner and free; the monthly load quota is
    /// only consumed when the draft is published.
    pub async fn create_load(&self, load: NewLoad) -> Result<Load, MarketplaceError> {
        self.db.create_load(load).await
    }

    /// Publishes a draft, consuming one unit of the owner's monthly load quota in the same transaction that flips
    /// the status to `Open`.
    ///
    /// After the publish has committed, the matching notifier runs and subscribers of the `load_published` hook
    /// are notified. Both are best-effort: a failure there is logged and the load stays published.
    pub async fn publish_load(&self, load_id: i64, owner_id: i64) -> Result<Load, MarketplaceError> {
        let load = self.db.publish_load(load_id, owner_id).await?;
        self.call_load_published_hook(&load).await;
        if let Err(e) = self.matcher.notify_matches(&load).await {
            warn!("🚛️ Matching fan-out for load {load_id} failed: {e}. The load remains published.");
        }
        Ok(load)
    }

    pub async fn update_load(
        &self,
        load_id: i64,
        owner_id: i64,
        update: UpdateLoadRequest,
    ) -> Result<Load, MarketplaceError> {
        self.db.update_load(load_id, owner_id, update).await
    }

    /// Stops new bids on an open load. Pending bids survive and can still be accepted.
    pub async fn close_bidding(&self, load_id: i64, owner_id: i64) -> Result<Load, MarketplaceError> {
        self.db.close_bidding(load_id, owner_id).await
    }

    pub async fn cancel_load(&self, load_id: i64, owner_id: i64, reason: &str) -> Result<Load, MarketplaceError> {
        self.db.cancel_load(load_id, owner_id, reason).await
    }

    pub async fn delete_load(&self, load_id: i64, owner_id: i64) -> Result<(), MarketplaceError> {
        self.db.delete_load(load_id, owner_id).await
    }

    /// Bumps the load's view counter. Anonymous bookkeeping used for shipper-side analytics.
    pub async fn record_load_view(&self, load_id: i64) -> Result<(), MarketplaceError> {
        self.db.record_load_view(load_id).await
    }

    async fn call_load_published_hook(&self, load: &Load) {
        for emitter in &self.producers.load_published_producer {
            trace!("🚛️ Notifying load published hook subscribers");
            let event = LoadPublishedEvent::new(load.clone());
            emitter.publish_event(event).await;
        }
    }
}
