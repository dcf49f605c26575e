use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{GeoPoint, RoutePoint, Trip},
    events::{EventProducers, TripCancelledEvent, TripCompletedEvent},
    fme_api::market_objects::CompleteTripRequest,
    traits::{CompletedTrip, MarketplaceDatabase, MarketplaceError, TripCancellation},
};

/// `TripFlowApi` drives a trip from `Scheduled` to a terminal state: starting, location tracking, proof artifacts,
/// completion and the cancellation rollback.
pub struct TripFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for TripFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TripFlowApi")
    }
}

impl<B> TripFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> TripFlowApi<B>
where B: MarketplaceDatabase
{
    /// Starts a scheduled trip, moving the load to `InTransit`. Refused before the load's pickup date. The
    /// optional starting location becomes the first sample in the route log.
    pub async fn start_trip(
        &self,
        trip_id: i64,
        driver_id: i64,
        location: Option<GeoPoint>,
    ) -> Result<Trip, MarketplaceError> {
        self.db.start_trip(trip_id, driver_id, location).await
    }

    /// Records a location sample for an in-progress trip. The route log is append-only.
    pub async fn record_location(
        &self,
        trip_id: i64,
        driver_id: i64,
        location: GeoPoint,
    ) -> Result<Trip, MarketplaceError> {
        self.db.record_location(trip_id, driver_id, location).await
    }

    pub async fn attach_pickup_proof(&self, trip_id: i64, driver_id: i64, uri: &str) -> Result<Trip, MarketplaceError> {
        self.db.attach_pickup_proof(trip_id, driver_id, uri).await
    }

    pub async fn attach_delivery_proof(
        &self,
        trip_id: i64,
        driver_id: i64,
        uri: &str,
        signature_uri: Option<&str>,
    ) -> Result<Trip, MarketplaceError> {
        self.db.attach_delivery_proof(trip_id, driver_id, uri, signature_uri).await
    }

    /// Completes an in-progress trip and marks the load `Delivered`. Fails with a validation error if no
    /// proof-of-delivery artifact exists and none is supplied.
    pub async fn complete_trip(
        &self,
        trip_id: i64,
        driver_id: i64,
        request: CompleteTripRequest,
    ) -> Result<CompletedTrip, MarketplaceError> {
        let completed = self.db.complete_trip(trip_id, driver_id, request).await?;
        self.call_trip_completed_hook(&completed).await;
        Ok(completed)
    }

    /// Cancels a live trip, reopening the load for bidding and returning the originating bid to `Pending`.
    pub async fn cancel_trip(
        &self,
        trip_id: i64,
        caller_id: i64,
        reason: &str,
    ) -> Result<TripCancellation, MarketplaceError> {
        let cancellation = self.db.cancel_trip(trip_id, caller_id, reason).await?;
        self.call_trip_cancelled_hook(&cancellation).await;
        Ok(cancellation)
    }

    /// The trip's route log in recording order.
    pub async fn fetch_route(&self, trip_id: i64) -> Result<Vec<RoutePoint>, MarketplaceError> {
        let route = self.db.fetch_route(trip_id).await?;
        Ok(route)
    }

    async fn call_trip_completed_hook(&self, completed: &CompletedTrip) {
        for emitter in &self.producers.trip_completed_producer {
            trace!("🏁️ Notifying trip completed hook subscribers");
            let event = TripCompletedEvent::new(completed.trip.clone(), completed.load.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_trip_cancelled_hook(&self, cancellation: &TripCancellation) {
        for emitter in &self.producers.trip_cancelled_producer {
            trace!("↩️ Notifying trip cancelled hook subscribers");
            let event = TripCancelledEvent::new(
                cancellation.trip.clone(),
                cancellation.load.clone(),
                cancellation.bid.clone(),
            );
            emitter.publish_event(event).await;
        }
    }
}
