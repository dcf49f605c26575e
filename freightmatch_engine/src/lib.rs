//! FreightMatch Engine
//!
//! The FreightMatch engine is the core of a road-freight marketplace: shippers post loads, transport operators bid
//! on them, and an accepted bid becomes a trip that is tracked through to delivery. This library is
//! transport-agnostic; it contains the lifecycle logic and nothing about HTTP or authentication.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types stored in the
//!    database, which are defined in the public `db_types` module.
//! 2. The engine public API ([`mod@fme_api`]): load, bid and trip flows, subscription quotas, and saved-search
//!    matching. A backend acts as storage for the engine by implementing the traits in the `traits` module.
//! 3. Events ([`mod@events`]). Marketplace milestones (a load published, a bid accepted, a trip completed) are
//!    emitted through a simple hook framework after the transaction that produced them has committed, so
//!    notification plumbing can be attached without touching the lifecycle code.
pub mod db_types;
pub mod events;
pub mod fme_api;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub mod test_utils;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use fme_api::{
    market_objects,
    BidFlowApi,
    LoadFlowApi,
    MatchingApi,
    QuotaApi,
    TripFlowApi,
};
pub use traits::{
    AcceptedBid,
    CompletedTrip,
    LookupError,
    MarketplaceDatabase,
    MarketplaceError,
    MarketplaceReader,
    QuotaStatus,
    TripCancellation,
};
