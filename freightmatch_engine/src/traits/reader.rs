use thiserror::Error;

use crate::{
    db_types::{Bid, Load, RoutePoint, SavedSearch, Subscription, Trip},
    fme_api::market_objects::LoadQueryFilter,
};

/// Plain read access to marketplace records. No authorization is applied here; visibility rules belong to the
/// transport layer sitting above the engine.
#[allow(async_fn_in_trait)]
pub trait MarketplaceReader {
    async fn fetch_load(&self, load_id: i64) -> Result<Option<Load>, LookupError>;

    async fn fetch_bid(&self, bid_id: i64) -> Result<Option<Bid>, LookupError>;

    async fn fetch_trip(&self, trip_id: i64) -> Result<Option<Trip>, LookupError>;

    /// The load's trip, if one was ever created and not superseded. At most one live trip exists per load.
    async fn fetch_trip_for_load(&self, load_id: i64) -> Result<Option<Trip>, LookupError>;

    /// All bids against a load, oldest first.
    async fn fetch_bids_for_load(&self, load_id: i64) -> Result<Vec<Bid>, LookupError>;

    /// All bids a driver has placed, oldest first.
    async fn fetch_bids_for_driver(&self, driver_id: i64) -> Result<Vec<Bid>, LookupError>;

    /// Fetches loads according to the criteria in the filter, ordered by `created_at` ascending.
    async fn search_loads(&self, query: LoadQueryFilter) -> Result<Vec<Load>, LookupError>;

    /// The trip's route log in recording order.
    async fn fetch_route(&self, trip_id: i64) -> Result<Vec<RoutePoint>, LookupError>;

    async fn fetch_subscription(&self, user_id: i64) -> Result<Option<Subscription>, LookupError>;

    /// All saved searches belonging to a driver.
    async fn fetch_saved_searches(&self, driver_id: i64) -> Result<Vec<SavedSearch>, LookupError>;
}

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for LookupError {
    fn from(e: sqlx::Error) -> Self {
        LookupError::DatabaseError(e.to_string())
    }
}
