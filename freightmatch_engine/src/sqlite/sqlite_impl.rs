//! `SqliteDatabase` is the concrete storage backend for the FreightMatch engine.
//!
//! It implements [`MarketplaceDatabase`] and [`MarketplaceReader`] on top of SQLite. Every lifecycle operation that
//! touches more than one record runs inside a single transaction scoped to the load's consistency unit, with
//! status-guarded writes re-checking state immediately before commit. Returning early from any of these methods
//! drops the open transaction, which rolls it back; partial writes are never visible.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{bids, db_url, loads, new_pool, saved_searches, subscriptions, trips};
use crate::{
    db_types::{
        Bid,
        BidStatus,
        GeoPoint,
        Load,
        LoadStatus,
        NewBid,
        NewLoad,
        NewSavedSearch,
        QuotaKind,
        RoutePoint,
        SavedSearch,
        Subscription,
        SubscriptionTier,
        Trip,
        TripStatus,
    },
    fme_api::market_objects::{CompleteTripRequest, LoadQueryFilter, UpdateBidRequest, UpdateLoadRequest},
    helpers::roll_if_new_period,
    traits::{
        AcceptedBid,
        CompletedTrip,
        LookupError,
        MarketplaceDatabase,
        MarketplaceError,
        MarketplaceReader,
        QuotaStatus,
        TripCancellation,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

fn unauthorized(action: &str, caller_id: i64) -> MarketplaceError {
    MarketplaceError::Unauthorized(format!("User {caller_id} may not {action}"))
}

fn invalid_state(entity: &str, id: i64, status: impl std::fmt::Display, action: &str) -> MarketplaceError {
    MarketplaceError::InvalidState(format!("{entity} {id} is {status}; cannot {action}"))
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_load(&self, load: NewLoad) -> Result<Load, MarketplaceError> {
        if !load.weight_kg.is_finite() || load.weight_kg <= 0.0 {
            return Err(MarketplaceError::Validation(format!("Load weight must be positive, got {}", load.weight_kg)));
        }
        if load.delivery_date < load.pickup_date {
            return Err(MarketplaceError::Validation("Delivery date precedes the pickup date".into()));
        }
        if load.suggested_price.is_negative() {
            return Err(MarketplaceError::Validation("Suggested price cannot be negative".into()));
        }
        let mut conn = self.pool.acquire().await?;
        let load = loads::insert_load(load, &mut conn).await?;
        debug!("🚛️ Load {} created as Draft by user {}", load.id, load.owner_id);
        Ok(load)
    }

    async fn publish_load(&self, load_id: i64, owner_id: i64) -> Result<Load, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let load = loads::fetch_load(load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(load_id))?;
        if load.owner_id != owner_id {
            return Err(unauthorized("publish this load", owner_id));
        }
        if load.status != LoadStatus::Draft {
            return Err(invalid_state("Load", load_id, load.status, "publish it"));
        }
        // Reserving the quota and flipping the status commit together or not at all
        subscriptions::reserve_quota(owner_id, QuotaKind::Load, Utc::now(), &mut tx).await?;
        let load = loads::publish_load(load_id, Utc::now(), &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Load {load_id} was modified concurrently")))?;
        tx.commit().await?;
        debug!("🚛️ Load {load_id} published by user {owner_id}");
        Ok(load)
    }

    async fn update_load(
        &self,
        load_id: i64,
        owner_id: i64,
        update: UpdateLoadRequest,
    ) -> Result<Load, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let load = loads::fetch_load(load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(load_id))?;
        if load.owner_id != owner_id {
            return Err(unauthorized("edit this load", owner_id));
        }
        if !load.status.is_editable() {
            return Err(invalid_state("Load", load_id, load.status, "edit it"));
        }
        let load = loads::update_load(load_id, update, &mut tx)
            .await?
            .ok_or(MarketplaceError::LoadNotFound(load_id))?;
        tx.commit().await?;
        trace!("🚛️ Load {load_id} updated by user {owner_id}");
        Ok(load)
    }

    async fn close_bidding(&self, load_id: i64, owner_id: i64) -> Result<Load, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let load = loads::fetch_load(load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(load_id))?;
        if load.owner_id != owner_id {
            return Err(unauthorized("close bidding on this load", owner_id));
        }
        if load.status != LoadStatus::Open {
            return Err(invalid_state("Load", load_id, load.status, "close bidding"));
        }
        let load = loads::set_status_guarded(load_id, &[LoadStatus::Open], LoadStatus::BiddingClosed, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Load {load_id} was modified concurrently")))?;
        tx.commit().await?;
        debug!("🚛️ Bidding closed on load {load_id}");
        Ok(load)
    }

    async fn cancel_load(&self, load_id: i64, owner_id: i64, reason: &str) -> Result<Load, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let load = loads::fetch_load(load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(load_id))?;
        if load.owner_id != owner_id {
            return Err(unauthorized("cancel this load", owner_id));
        }
        if !load.status.is_editable() {
            // Assigned and in-transit loads are released through trip cancellation, not here
            return Err(invalid_state("Load", load_id, load.status, "cancel it directly"));
        }
        let load = loads::cancel_load(load_id, reason, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Load {load_id} was modified concurrently")))?;
        tx.commit().await?;
        info!("🚛️ Load {load_id} cancelled by its owner: {reason}");
        Ok(load)
    }

    async fn delete_load(&self, load_id: i64, owner_id: i64) -> Result<(), MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let load = loads::fetch_load(load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(load_id))?;
        if load.owner_id != owner_id {
            return Err(unauthorized("delete this load", owner_id));
        }
        if !load.status.is_editable() {
            return Err(invalid_state("Load", load_id, load.status, "delete it"));
        }
        let n = bids::delete_bids_for_load(load_id, &mut tx).await?;
        loads::delete_load(load_id, &mut tx).await?;
        tx.commit().await?;
        info!("🚛️ Load {load_id} deleted along with {n} bids");
        Ok(())
    }

    async fn record_load_view(&self, load_id: i64) -> Result<(), MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        loads::incr_view_count(load_id, &mut conn).await
    }

    async fn place_bid(&self, bid: NewBid) -> Result<Bid, MarketplaceError> {
        if bid.amount.is_negative() {
            return Err(MarketplaceError::Validation("Bid amount cannot be negative".into()));
        }
        let mut tx = self.pool.begin().await?;
        let load = loads::fetch_load(bid.load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(bid.load_id))?;
        if load.owner_id == bid.driver_id {
            return Err(MarketplaceError::Validation("A load owner cannot bid on their own load".into()));
        }
        if load.status != LoadStatus::Open {
            return Err(invalid_state("Load", load.id, load.status, "accept new bids"));
        }
        if bids::active_bid_exists(bid.load_id, bid.driver_id, &mut tx).await? {
            return Err(MarketplaceError::Conflict(format!(
                "Driver {} already has a live bid on load {}",
                bid.driver_id, bid.load_id
            )));
        }
        subscriptions::reserve_quota(bid.driver_id, QuotaKind::Bid, Utc::now(), &mut tx).await?;
        let bid = bids::insert_bid(bid, &mut tx).await?;
        tx.commit().await?;
        debug!("🪙️ Bid {} placed on load {} by driver {}", bid.id, bid.load_id, bid.driver_id);
        Ok(bid)
    }

    async fn update_bid(&self, bid_id: i64, driver_id: i64, update: UpdateBidRequest) -> Result<Bid, MarketplaceError> {
        if let Some(amount) = update.amount {
            if amount.is_negative() {
                return Err(MarketplaceError::Validation("Bid amount cannot be negative".into()));
            }
        }
        let mut tx = self.pool.begin().await?;
        let bid = bids::fetch_bid(bid_id, &mut tx).await?.ok_or(MarketplaceError::BidNotFound(bid_id))?;
        if bid.driver_id != driver_id {
            return Err(unauthorized("edit this bid", driver_id));
        }
        if bid.status != BidStatus::Pending {
            return Err(invalid_state("Bid", bid_id, bid.status, "edit it"));
        }
        let bid = bids::update_bid(bid_id, update, &mut tx).await?.ok_or(MarketplaceError::BidNotFound(bid_id))?;
        tx.commit().await?;
        trace!("🪙️ Bid {bid_id} updated by driver {driver_id}");
        Ok(bid)
    }

    async fn withdraw_bid(&self, bid_id: i64, driver_id: i64) -> Result<Bid, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let bid = bids::fetch_bid(bid_id, &mut tx).await?.ok_or(MarketplaceError::BidNotFound(bid_id))?;
        if bid.driver_id != driver_id {
            return Err(unauthorized("withdraw this bid", driver_id));
        }
        if bid.status != BidStatus::Pending {
            return Err(invalid_state("Bid", bid_id, bid.status, "withdraw it"));
        }
        let bid = bids::set_status_guarded(bid_id, BidStatus::Pending, BidStatus::Withdrawn, None, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Bid {bid_id} was decided concurrently")))?;
        tx.commit().await?;
        debug!("🪙️ Bid {bid_id} withdrawn by driver {driver_id}");
        Ok(bid)
    }

    async fn reject_bid(&self, bid_id: i64, owner_id: i64, reason: &str) -> Result<Bid, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let bid = bids::fetch_bid(bid_id, &mut tx).await?.ok_or(MarketplaceError::BidNotFound(bid_id))?;
        let load = loads::fetch_load(bid.load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(bid.load_id))?;
        if load.owner_id != owner_id {
            return Err(unauthorized("reject bids on this load", owner_id));
        }
        if bid.status != BidStatus::Pending {
            return Err(invalid_state("Bid", bid_id, bid.status, "reject it"));
        }
        let bid = bids::set_status_guarded(bid_id, BidStatus::Pending, BidStatus::Rejected, Some(reason), &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Bid {bid_id} was decided concurrently")))?;
        tx.commit().await?;
        debug!("🪙️ Bid {bid_id} rejected by the load owner: {reason}");
        Ok(bid)
    }

    /// The single-winner critical section. The pre-checks give early, friendly errors; the guarded writes are what
    /// actually close the race. If another accept committed between our read and our write, the guards match zero
    /// rows and the transaction rolls back with a `Conflict`.
    async fn accept_bid(&self, bid_id: i64, owner_id: i64) -> Result<AcceptedBid, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let bid = bids::fetch_bid(bid_id, &mut tx).await?.ok_or(MarketplaceError::BidNotFound(bid_id))?;
        let load = loads::fetch_load(bid.load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(bid.load_id))?;
        if load.owner_id != owner_id {
            return Err(unauthorized("accept bids on this load", owner_id));
        }
        if bid.status != BidStatus::Pending {
            return Err(invalid_state("Bid", bid_id, bid.status, "accept it"));
        }
        if !load.status.accepts_bid() {
            return Err(invalid_state("Load", load.id, load.status, "accept a bid"));
        }
        let load = loads::set_status_guarded(
            load.id,
            &[LoadStatus::Open, LoadStatus::BiddingClosed],
            LoadStatus::Assigned,
            &mut tx,
        )
        .await?
        .ok_or_else(|| MarketplaceError::Conflict(format!("Load {} was assigned concurrently", bid.load_id)))?;
        let bid = bids::set_status_guarded(bid_id, BidStatus::Pending, BidStatus::Accepted, None, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Bid {bid_id} was decided concurrently")))?;
        let trip = trips::insert_trip(&load, &bid, &mut tx).await?;
        tx.commit().await?;
        info!("🤝️ Bid {bid_id} accepted on load {}: trip {} scheduled at {}", load.id, trip.id, trip.agreed_price);
        Ok(AcceptedBid { bid, load, trip })
    }

    async fn start_trip(
        &self,
        trip_id: i64,
        driver_id: i64,
        location: Option<GeoPoint>,
    ) -> Result<Trip, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let trip = trips::fetch_trip(trip_id, &mut tx).await?.ok_or(MarketplaceError::TripNotFound(trip_id))?;
        if trip.driver_id != driver_id {
            return Err(unauthorized("start this trip", driver_id));
        }
        if trip.status != TripStatus::Scheduled {
            return Err(invalid_state("Trip", trip_id, trip.status, "start it"));
        }
        let load = loads::fetch_load(trip.load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(trip.load_id))?;
        let now = Utc::now();
        if load.pickup_date > now {
            return Err(MarketplaceError::InvalidState(format!(
                "Load {} is only scheduled for pickup at {}; the trip cannot start early",
                load.id, load.pickup_date
            )));
        }
        let mut trip = trips::start_trip_guarded(trip_id, now, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Trip {trip_id} was modified concurrently")))?;
        loads::set_status_guarded(load.id, &[LoadStatus::Assigned], LoadStatus::InTransit, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Load {} was modified concurrently", load.id)))?;
        if let Some(location) = location {
            trips::append_route_point(trip_id, location, now, &mut tx).await?;
            trip = trips::set_current_location(trip_id, location, now, &mut tx)
                .await?
                .ok_or_else(|| MarketplaceError::Conflict(format!("Trip {trip_id} was modified concurrently")))?;
        }
        tx.commit().await?;
        info!("🛣️ Trip {trip_id} started by driver {driver_id}");
        Ok(trip)
    }

    async fn record_location(
        &self,
        trip_id: i64,
        driver_id: i64,
        location: GeoPoint,
    ) -> Result<Trip, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let trip = trips::fetch_trip(trip_id, &mut tx).await?.ok_or(MarketplaceError::TripNotFound(trip_id))?;
        if trip.driver_id != driver_id {
            return Err(unauthorized("report locations for this trip", driver_id));
        }
        if trip.status != TripStatus::InProgress {
            return Err(invalid_state("Trip", trip_id, trip.status, "record a location"));
        }
        let now = Utc::now();
        trips::append_route_point(trip_id, location, now, &mut tx).await?;
        let trip = trips::set_current_location(trip_id, location, now, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Trip {trip_id} was modified concurrently")))?;
        tx.commit().await?;
        trace!("🛣️ Trip {trip_id} location updated to ({}, {})", location.lat, location.lng);
        Ok(trip)
    }

    async fn attach_pickup_proof(&self, trip_id: i64, driver_id: i64, uri: &str) -> Result<Trip, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let trip = trips::fetch_trip(trip_id, &mut tx).await?.ok_or(MarketplaceError::TripNotFound(trip_id))?;
        if trip.driver_id != driver_id {
            return Err(unauthorized("attach proofs to this trip", driver_id));
        }
        if trip.status != TripStatus::InProgress {
            return Err(invalid_state("Trip", trip_id, trip.status, "attach a pickup proof"));
        }
        let trip = trips::attach_pickup_proof(trip_id, uri, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Trip {trip_id} was modified concurrently")))?;
        tx.commit().await?;
        debug!("🛣️ Pickup proof attached to trip {trip_id}");
        Ok(trip)
    }

    async fn attach_delivery_proof(
        &self,
        trip_id: i64,
        driver_id: i64,
        uri: &str,
        signature_uri: Option<&str>,
    ) -> Result<Trip, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let trip = trips::fetch_trip(trip_id, &mut tx).await?.ok_or(MarketplaceError::TripNotFound(trip_id))?;
        if trip.driver_id != driver_id {
            return Err(unauthorized("attach proofs to this trip", driver_id));
        }
        if trip.status != TripStatus::InProgress {
            return Err(invalid_state("Trip", trip_id, trip.status, "attach a delivery proof"));
        }
        let trip = trips::attach_delivery_proof(trip_id, uri, signature_uri, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Trip {trip_id} was modified concurrently")))?;
        tx.commit().await?;
        debug!("🛣️ Delivery proof attached to trip {trip_id}");
        Ok(trip)
    }

    async fn complete_trip(
        &self,
        trip_id: i64,
        driver_id: i64,
        request: CompleteTripRequest,
    ) -> Result<CompletedTrip, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let trip = trips::fetch_trip(trip_id, &mut tx).await?.ok_or(MarketplaceError::TripNotFound(trip_id))?;
        if trip.driver_id != driver_id {
            return Err(unauthorized("complete this trip", driver_id));
        }
        if trip.status != TripStatus::InProgress {
            return Err(invalid_state("Trip", trip_id, trip.status, "complete it"));
        }
        if trip.delivery_proof_uri.is_none() && request.delivery_proof_uri.is_none() {
            return Err(MarketplaceError::Validation(
                "A proof-of-delivery artifact is required to complete a trip".into(),
            ));
        }
        let trip = trips::complete_trip_guarded(trip_id, &request, Utc::now(), &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Trip {trip_id} was modified concurrently")))?;
        let load = loads::set_status_guarded(trip.load_id, &[LoadStatus::InTransit], LoadStatus::Delivered, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Load {} was modified concurrently", trip.load_id)))?;
        tx.commit().await?;
        info!("🏁️ Trip {trip_id} completed; load {} delivered", load.id);
        Ok(CompletedTrip { trip, load })
    }

    /// The three-entity rollback. All three guarded writes must match; otherwise the transaction rolls back and
    /// nothing is left half-unwound — the load is never stranded in `Assigned`/`InTransit` without a live trip,
    /// and the bid is never left `Accepted` without a trip.
    async fn cancel_trip(
        &self,
        trip_id: i64,
        caller_id: i64,
        reason: &str,
    ) -> Result<TripCancellation, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let trip = trips::fetch_trip(trip_id, &mut tx).await?.ok_or(MarketplaceError::TripNotFound(trip_id))?;
        let load = loads::fetch_load(trip.load_id, &mut tx).await?.ok_or(MarketplaceError::LoadNotFound(trip.load_id))?;
        if caller_id != trip.driver_id && caller_id != load.owner_id {
            return Err(unauthorized("cancel this trip", caller_id));
        }
        if matches!(trip.status, TripStatus::Completed | TripStatus::Cancelled) {
            return Err(invalid_state("Trip", trip_id, trip.status, "cancel it"));
        }
        let trip = trips::cancel_trip_guarded(trip_id, reason, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Trip {trip_id} was decided concurrently")))?;
        let load =
            loads::set_status_guarded(load.id, &[LoadStatus::Assigned, LoadStatus::InTransit], LoadStatus::Open, &mut tx)
                .await?
                .ok_or_else(|| MarketplaceError::Conflict(format!("Load {} was modified concurrently", load.id)))?;
        let bid = bids::set_status_guarded(trip.bid_id, BidStatus::Accepted, BidStatus::Pending, Some(reason), &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::Conflict(format!("Bid {} was modified concurrently", trip.bid_id)))?;
        tx.commit().await?;
        info!(
            "↩️ Trip {trip_id} cancelled by user {caller_id}: {reason}. Load {} reopened, bid {} back to Pending",
            load.id, bid.id
        );
        Ok(TripCancellation { trip, load, bid })
    }

    async fn upsert_subscription(
        &self,
        user_id: i64,
        tier: SubscriptionTier,
    ) -> Result<Subscription, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        subscriptions::upsert_subscription(user_id, tier, Utc::now(), &mut conn).await
    }

    async fn quota_status(
        &self,
        user_id: i64,
        kind: QuotaKind,
        now: DateTime<Utc>,
    ) -> Result<QuotaStatus, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let sub = subscriptions::fetch_subscription(user_id, &mut conn)
            .await?
            .ok_or(MarketplaceError::SubscriptionNotFound(user_id))?;
        // Report as the counters would stand after a roll, without writing anything
        let counters = roll_if_new_period(sub.counters(), now);
        let used = match kind {
            QuotaKind::Load => counters.loads_posted,
            QuotaKind::Bid => counters.bids_placed,
        };
        Ok(QuotaStatus { kind, tier: sub.tier, limit: sub.tier.limit_for(kind), used })
    }

    async fn create_saved_search(&self, search: NewSavedSearch) -> Result<SavedSearch, MarketplaceError> {
        if let (Some(min), Some(max)) = (search.min_weight_kg, search.max_weight_kg) {
            if min > max {
                return Err(MarketplaceError::Validation(format!(
                    "Saved search weight range is inverted: {min} > {max}"
                )));
            }
        }
        let mut conn = self.pool.acquire().await?;
        let search = saved_searches::insert_saved_search(search, &mut conn).await?;
        debug!("🔔️ Saved search {} stored for driver {}", search.id, search.driver_id);
        Ok(search)
    }

    async fn delete_saved_search(&self, search_id: i64, driver_id: i64) -> Result<(), MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let n = saved_searches::delete_saved_search(search_id, driver_id, &mut conn).await?;
        if n == 0 {
            return Err(MarketplaceError::Unauthorized(format!(
                "Saved search {search_id} does not exist or does not belong to driver {driver_id}"
            )));
        }
        Ok(())
    }

    async fn saved_searches_matching(&self, load: &Load) -> Result<Vec<SavedSearch>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        saved_searches::searches_matching_load(load, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), MarketplaceError> {
        self.pool.close().await;
        Ok(())
    }
}

impl MarketplaceReader for SqliteDatabase {
    async fn fetch_load(&self, load_id: i64) -> Result<Option<Load>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let load = loads::fetch_load(load_id, &mut conn).await?;
        Ok(load)
    }

    async fn fetch_bid(&self, bid_id: i64) -> Result<Option<Bid>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let bid = bids::fetch_bid(bid_id, &mut conn).await?;
        Ok(bid)
    }

    async fn fetch_trip(&self, trip_id: i64) -> Result<Option<Trip>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let trip = trips::fetch_trip(trip_id, &mut conn).await?;
        Ok(trip)
    }

    async fn fetch_trip_for_load(&self, load_id: i64) -> Result<Option<Trip>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let trip = trips::fetch_trip_for_load(load_id, &mut conn).await?;
        Ok(trip)
    }

    async fn fetch_bids_for_load(&self, load_id: i64) -> Result<Vec<Bid>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let bids = bids::fetch_bids_for_load(load_id, &mut conn).await?;
        Ok(bids)
    }

    async fn fetch_bids_for_driver(&self, driver_id: i64) -> Result<Vec<Bid>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let bids = bids::fetch_bids_for_driver(driver_id, &mut conn).await?;
        Ok(bids)
    }

    async fn search_loads(&self, query: LoadQueryFilter) -> Result<Vec<Load>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let loads = loads::search_loads(query, &mut conn).await?;
        Ok(loads)
    }

    async fn fetch_route(&self, trip_id: i64) -> Result<Vec<RoutePoint>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let route = trips::fetch_route(trip_id, &mut conn).await?;
        Ok(route)
    }

    async fn fetch_subscription(&self, user_id: i64) -> Result<Option<Subscription>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let sub = subscriptions::fetch_subscription(user_id, &mut conn).await?;
        Ok(sub)
    }

    async fn fetch_saved_searches(&self, driver_id: i64) -> Result<Vec<SavedSearch>, LookupError> {
        let mut conn = self.pool.acquire().await?;
        let searches = saved_searches::fetch_saved_searches(driver_id, &mut conn).await?;
        Ok(searches)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new() -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str()).await
    }

    pub async fn new_with_url(url: &str) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
