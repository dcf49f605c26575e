use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{Bid, Load, NewBid, NewLoad, NewSavedSearch, QuotaKind, SavedSearch, Subscription, SubscriptionTier, Trip, GeoPoint},
    fme_api::market_objects::{CompleteTripRequest, UpdateBidRequest, UpdateLoadRequest},
    traits::{AcceptedBid, CompletedTrip, LookupError, MarketplaceReader, TripCancellation},
};

/// The transactional write behaviour a backend must provide to power the Load→Bid→Trip lifecycle.
///
/// Every method that touches more than one record performs its read-modify-write sequence inside a single database
/// transaction scoped to the load's consistency unit (the load, its bids, and its trip). State is re-checked with
/// guarded writes immediately before commit, so a concurrent writer that loses a race gets
/// [`MarketplaceError::Conflict`] and no partial write becomes visible.
///
/// Quota reservation is *part of* the guarded operation's transaction ([`publish_load`][Self::publish_load] and
/// [`place_bid`][Self::place_bid]); there is no separate "check" step for callers to misuse.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + MarketplaceReader {
    /// The URL of the database
    fn url(&self) -> &str;

    //----------------------------------------- Load lifecycle -----------------------------------------------------

    /// Validates and stores a new load in `Draft` status. Draft creation is free; the load quota is only consumed
    /// at publish time.
    async fn create_load(&self, load: NewLoad) -> Result<Load, MarketplaceError>;

    /// Publishes a draft load, making it visible to drivers.
    ///
    /// In a single atomic transaction:
    /// * verifies the caller owns the load and that it is in `Draft` status,
    /// * reserves one unit of the caller's monthly load quota (lazily rolling the counter if the calendar month
    ///   has changed),
    /// * transitions the load `Draft → Open` and stamps `published_at`.
    async fn publish_load(&self, load_id: i64, owner_id: i64) -> Result<Load, MarketplaceError>;

    /// Applies the given field updates to a load. Permitted only while the load is editable
    /// (`Draft`, `Open` or `BiddingClosed`).
    async fn update_load(&self, load_id: i64, owner_id: i64, update: UpdateLoadRequest)
        -> Result<Load, MarketplaceError>;

    /// Stops new bids on an open load (`Open → BiddingClosed`). Existing pending bids can still be accepted.
    async fn close_bidding(&self, load_id: i64, owner_id: i64) -> Result<Load, MarketplaceError>;

    /// Cancels a load. Permitted from any non-terminal state that has no live trip; a load that has been assigned
    /// must be released through trip cancellation first.
    async fn cancel_load(&self, load_id: i64, owner_id: i64, reason: &str) -> Result<Load, MarketplaceError>;

    /// Deletes a load outright, cascading the delete to all of its bids. Permitted only pre-assignment.
    async fn delete_load(&self, load_id: i64, owner_id: i64) -> Result<(), MarketplaceError>;

    /// Bumps the load's view counter. Fire-and-forget bookkeeping; no authorization.
    async fn record_load_view(&self, load_id: i64) -> Result<(), MarketplaceError>;

    //----------------------------------------- Bid lifecycle ------------------------------------------------------

    /// Places a new bid against an open load.
    ///
    /// In a single atomic transaction:
    /// * verifies the load exists and is `Open`,
    /// * rejects a second live bid from the same driver on the same load,
    /// * reserves one unit of the driver's monthly bid quota,
    /// * inserts the bid in `Pending` status. The load record itself is not modified.
    async fn place_bid(&self, bid: NewBid) -> Result<Bid, MarketplaceError>;

    /// Lets the bidding driver amend a pending bid (price, message, vehicle).
    async fn update_bid(&self, bid_id: i64, driver_id: i64, update: UpdateBidRequest) -> Result<Bid, MarketplaceError>;

    /// Withdraws a pending bid. Only the bidding driver may do this.
    async fn withdraw_bid(&self, bid_id: i64, driver_id: i64) -> Result<Bid, MarketplaceError>;

    /// Rejects a pending bid. Only the load's owner may do this.
    async fn reject_bid(&self, bid_id: i64, owner_id: i64, reason: &str) -> Result<Bid, MarketplaceError>;

    /// Accepts a bid and converts it into a trip. This is the single-winner critical section of the marketplace.
    ///
    /// In one atomic transaction: the bid is re-checked to be `Pending` and the load to be `Open` or
    /// `BiddingClosed` with guarded writes, the bid becomes `Accepted`, the load becomes `Assigned`, and a trip is
    /// created in `Scheduled` status with `agreed_price` copied from the bid. If a concurrent accept won the race,
    /// the guarded write affects zero rows, the transaction rolls back, and [`MarketplaceError::Conflict`] is
    /// returned.
    ///
    /// Competing pending bids are left `Pending` so that one of them can be accepted if the trip is later
    /// cancelled. Rejecting them is an explicit, separate call.
    async fn accept_bid(&self, bid_id: i64, owner_id: i64) -> Result<AcceptedBid, MarketplaceError>;

    //----------------------------------------- Trip lifecycle -----------------------------------------------------

    /// Starts a scheduled trip. Only the assigned driver may start it, and not before the load's pickup date.
    /// Atomically: trip `Scheduled → InProgress` with `start_time = now`, load `Assigned → InTransit`, and the
    /// optional starting location seeds the route log.
    async fn start_trip(&self, trip_id: i64, driver_id: i64, location: Option<GeoPoint>)
        -> Result<Trip, MarketplaceError>;

    /// Appends a location sample to the trip's route log and replaces the current location. The route log is an
    /// append-only audit trail; samples are never rewritten.
    async fn record_location(&self, trip_id: i64, driver_id: i64, location: GeoPoint)
        -> Result<Trip, MarketplaceError>;

    /// Attaches a proof-of-pickup artifact (an opaque URI) to an in-progress trip.
    async fn attach_pickup_proof(&self, trip_id: i64, driver_id: i64, uri: &str) -> Result<Trip, MarketplaceError>;

    /// Attaches a proof-of-delivery artifact, optionally with a signature artifact, to an in-progress trip.
    async fn attach_delivery_proof(
        &self,
        trip_id: i64,
        driver_id: i64,
        uri: &str,
        signature_uri: Option<&str>,
    ) -> Result<Trip, MarketplaceError>;

    /// Completes an in-progress trip. A proof-of-delivery artifact must exist — either previously attached or
    /// supplied in the request — otherwise the call fails with a validation error. Atomically: trip
    /// `InProgress → Completed` with `end_time = now` and payment details stamped, load → `Delivered`.
    async fn complete_trip(
        &self,
        trip_id: i64,
        driver_id: i64,
        request: CompleteTripRequest,
    ) -> Result<CompletedTrip, MarketplaceError>;

    /// Cancels a trip. Either the assigned driver or the load's owner may cancel; a completed trip cannot be.
    ///
    /// Performs the three-entity rollback in one atomic transaction: trip → `Cancelled`, load → `Open` (reopened
    /// for bidding), originating bid → `Pending`. The load is never left assigned without a live trip, and the bid
    /// is never left accepted without a trip.
    async fn cancel_trip(&self, trip_id: i64, caller_id: i64, reason: &str)
        -> Result<TripCancellation, MarketplaceError>;

    //----------------------------------------- Subscriptions ------------------------------------------------------

    /// Creates the subscription record for a user, or changes its tier if one exists. Counters are preserved on a
    /// tier change.
    async fn upsert_subscription(&self, user_id: i64, tier: SubscriptionTier)
        -> Result<Subscription, MarketplaceError>;

    /// Reports the user's quota position for the given kind as of `now`, applying the period roll virtually.
    /// Nothing is written.
    async fn quota_status(
        &self,
        user_id: i64,
        kind: QuotaKind,
        now: DateTime<Utc>,
    ) -> Result<crate::traits::QuotaStatus, MarketplaceError>;

    //----------------------------------------- Saved searches -----------------------------------------------------

    /// Stores a driver's standing search.
    async fn create_saved_search(&self, search: NewSavedSearch) -> Result<SavedSearch, MarketplaceError>;

    /// Removes a saved search. Only its owner may remove it.
    async fn delete_saved_search(&self, search_id: i64, driver_id: i64) -> Result<(), MarketplaceError>;

    /// All saved searches that match the given load. Used by the matching notifier after a publish commits.
    async fn saved_searches_matching(&self, load: &Load) -> Result<Vec<SavedSearch>, MarketplaceError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), MarketplaceError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("There is an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested load {0} does not exist")]
    LoadNotFound(i64),
    #[error("The requested bid {0} does not exist")]
    BidNotFound(i64),
    #[error("The requested trip {0} does not exist")]
    TripNotFound(i64),
    #[error("No subscription record exists for user {0}")]
    SubscriptionNotFound(i64),
    #[error("Not authorized: {0}")]
    Unauthorized(String),
    #[error("The entity is not in a state that permits this transition: {0}")]
    InvalidState(String),
    #[error("Monthly {kind} quota reached ({used}/{limit}). {upgrade_hint}")]
    QuotaExceeded { kind: QuotaKind, limit: i64, used: i64, upgrade_hint: String },
    #[error("A concurrent update won the race: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for MarketplaceError {
    fn from(e: sqlx::Error) -> Self {
        MarketplaceError::DatabaseError(e.to_string())
    }
}

impl From<LookupError> for MarketplaceError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::DatabaseError(s) => MarketplaceError::DatabaseError(s),
            LookupError::QueryError(s) => MarketplaceError::Validation(s),
        }
    }
}

impl MarketplaceError {
    /// Whether a caller may reasonably retry the failed call once. Only race losses qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MarketplaceError::Conflict(_))
    }
}
