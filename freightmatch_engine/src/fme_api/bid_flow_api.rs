use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Bid, NewBid},
    events::{BidAcceptedEvent, BidPlacedEvent, EventProducers},
    fme_api::market_objects::UpdateBidRequest,
    traits::{AcceptedBid, MarketplaceDatabase, MarketplaceError},
};

/// `BidFlowApi` handles the driver and shipper sides of the bidding phase: placing, amending, withdrawing,
/// rejecting and — the critical section — accepting a bid.
pub struct BidFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for BidFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BidFlowApi")
    }
}

impl<B> BidFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> BidFlowApi<B>
where B: MarketplaceDatabase
{
    /// Places a bid against an open load, consuming one unit of the driver's monthly bid quota in the same
    /// transaction as the insert. A driver can hold at most one live bid per load.
    pub async fn place_bid(&self, bid: NewBid) -> Result<Bid, MarketplaceError> {
        let bid = self.db.place_bid(bid).await?;
        self.call_bid_placed_hook(&bid).await;
        Ok(bid)
    }

    pub async fn update_bid(&self, bid_id: i64, driver_id: i64, update: UpdateBidRequest) -> Result<Bid, MarketplaceError> {
        self.db.update_bid(bid_id, driver_id, update).await
    }

    pub async fn withdraw_bid(&self, bid_id: i64, driver_id: i64) -> Result<Bid, MarketplaceError> {
        self.db.withdraw_bid(bid_id, driver_id).await
    }

    pub async fn reject_bid(&self, bid_id: i64, owner_id: i64, reason: &str) -> Result<Bid, MarketplaceError> {
        self.db.reject_bid(bid_id, owner_id, reason).await
    }

    /// Accepts a bid, creating the trip. Exactly one accept can succeed per load; a losing concurrent accept
    /// observes [`MarketplaceError::Conflict`] and may retry against the (now assigned) load to get a friendlier
    /// state error. Competing pending bids are left untouched.
    pub async fn accept_bid(&self, bid_id: i64, owner_id: i64) -> Result<AcceptedBid, MarketplaceError> {
        let accepted = self.db.accept_bid(bid_id, owner_id).await?;
        self.call_bid_accepted_hook(&accepted).await;
        info!("🤝️ Bid {bid_id} accepted; trip {} is scheduled", accepted.trip.id);
        Ok(accepted)
    }

    async fn call_bid_placed_hook(&self, bid: &Bid) {
        if self.producers.bid_placed_producer.is_empty() {
            return;
        }
        // The load owner wants the load context in the notification, not just the bid
        let load = match self.db.fetch_load(bid.load_id).await {
            Ok(Some(load)) => load,
            Ok(None) => {
                warn!("🪙️ Load {} vanished before the bid placed hook could fire", bid.load_id);
                return;
            },
            Err(e) => {
                warn!("🪙️ Could not load context for the bid placed hook: {e}");
                return;
            },
        };
        for emitter in &self.producers.bid_placed_producer {
            trace!("🪙️ Notifying bid placed hook subscribers");
            let event = BidPlacedEvent::new(bid.clone(), load.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_bid_accepted_hook(&self, accepted: &AcceptedBid) {
        for emitter in &self.producers.bid_accepted_producer {
            trace!("🪙️ Notifying bid accepted hook subscribers");
            let event = BidAcceptedEvent::new(accepted.bid.clone(), accepted.load.clone(), accepted.trip.clone());
            emitter.publish_event(event).await;
        }
    }
}
