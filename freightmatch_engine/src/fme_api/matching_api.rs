use std::{collections::HashSet, fmt::Debug};

use log::*;

use crate::{
    db_types::Load,
    events::{EventProducers, LoadMatchedEvent},
    traits::{MarketplaceDatabase, MarketplaceError},
};

/// `MatchingApi` fans a freshly published load out to the drivers whose saved searches it satisfies.
///
/// Matching is a read plus an event per hit; it runs after the publish transaction has committed and its failure
/// never affects the published load.
pub struct MatchingApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for MatchingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchingApi")
    }
}

impl<B> MatchingApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> MatchingApi<B>
where B: MarketplaceDatabase
{
    /// Finds every saved search the load satisfies and emits one [`LoadMatchedEvent`] per matching driver. A
    /// driver with several overlapping searches is notified once, on their oldest matching search. Returns the
    /// number of drivers notified.
    pub async fn notify_matches(&self, load: &Load) -> Result<usize, MarketplaceError> {
        let searches = self.db.saved_searches_matching(load).await?;
        let mut notified = HashSet::new();
        for search in searches {
            if !notified.insert(search.driver_id) {
                continue;
            }
            let event = LoadMatchedEvent::new(load.clone(), search);
            for emitter in &self.producers.load_matched_producer {
                emitter.publish_event(event.clone()).await;
            }
        }
        debug!("🔔️ Load {} matched saved searches of {} drivers", load.id, notified.len());
        Ok(notified.len())
    }
}
