//! The behaviour that a storage backend must provide to power the marketplace engine.
//!
//! There is deliberately exactly one backend trait pair: [`MarketplaceDatabase`] for transactional lifecycle writes
//! and [`MarketplaceReader`] for plain lookups. A backend implements both against a single store; the lifecycle
//! APIs in [`crate::fme_api`] only ever talk to these traits.

mod data_objects;
mod marketplace_database;
mod reader;

pub use data_objects::{AcceptedBid, CompletedTrip, QuotaStatus, TripCancellation};
pub use marketplace_database::{MarketplaceDatabase, MarketplaceError};
pub use reader::{LookupError, MarketplaceReader};
