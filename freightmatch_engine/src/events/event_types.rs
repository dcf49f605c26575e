use serde::{Deserialize, Serialize};

use crate::db_types::{Bid, Load, SavedSearch, Trip};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadPublishedEvent {
    pub load: Load,
}

impl LoadPublishedEvent {
    pub fn new(load: Load) -> Self {
        Self { load }
    }
}

/// A published load matched one driver's saved search. One event is emitted per matching search, so a load that
/// matches ten searches produces ten events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMatchedEvent {
    pub load: Load,
    pub search: SavedSearch,
}

impl LoadMatchedEvent {
    pub fn new(load: Load, search: SavedSearch) -> Self {
        Self { load, search }
    }

    /// The driver to notify.
    pub fn driver_id(&self) -> i64 {
        self.search.driver_id
    }

    /// A one-line human-readable summary, suitable as a notification body.
    pub fn summary(&self) -> String {
        format!(
            "New load: {} from {} ({}) to {} ({}), {:.0} kg, asking {} {}",
            self.load.cargo_type,
            self.load.pickup_city,
            self.load.pickup_province,
            self.load.delivery_city,
            self.load.delivery_province,
            self.load.weight_kg,
            self.load.currency,
            self.load.suggested_price,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidPlacedEvent {
    pub bid: Bid,
    pub load: Load,
}

impl BidPlacedEvent {
    pub fn new(bid: Bid, load: Load) -> Self {
        Self { bid, load }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidAcceptedEvent {
    pub bid: Bid,
    pub load: Load,
    pub trip: Trip,
}

impl BidAcceptedEvent {
    pub fn new(bid: Bid, load: Load, trip: Trip) -> Self {
        Self { bid, load, trip }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripCompletedEvent {
    pub trip: Trip,
    pub load: Load,
}

impl TripCompletedEvent {
    pub fn new(trip: Trip, load: Load) -> Self {
        Self { trip, load }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripCancelledEvent {
    pub trip: Trip,
    pub load: Load,
    pub bid: Bid,
}

impl TripCancelledEvent {
    pub fn new(trip: Trip, load: Load, bid: Bid) -> Self {
        Self { trip, load, bid }
    }

    pub fn reason(&self) -> &str {
        self.trip.cancellation_reason.as_deref().unwrap_or("No reason given")
    }
}
