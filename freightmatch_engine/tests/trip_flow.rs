//! Trip lifecycle edges: the cancellation rollback, proof requirements, pickup-date gating, the append-only route
//! log, and authorization checks along the way.

use chrono::{Duration, Utc};
use freightmatch_engine::{
    db_types::{BidStatus, GeoPoint, LoadStatus, SubscriptionTier, TripStatus},
    events::EventProducers,
    market_objects::{CompleteTripRequest, UpdateLoadRequest},
    test_utils::{prepare_test_env, random_db_path, sample_bid, sample_load},
    AcceptedBid,
    BidFlowApi,
    LoadFlowApi,
    MarketplaceError,
    MarketplaceReader,
    QuotaApi,
    SqliteDatabase,
    TripFlowApi,
};

const SHIPPER: i64 = 100;
const DRIVER_A: i64 = 200;
const DRIVER_B: i64 = 201;
const STRANGER: i64 = 999;

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url).await.expect("Error creating database");
    let quotas = QuotaApi::new(db.clone());
    for user in [SHIPPER, DRIVER_A, DRIVER_B, STRANGER] {
        quotas.set_tier(user, SubscriptionTier::Pro).await.expect("Error provisioning user");
    }
    db
}

/// Publishes a load, places two bids and accepts driver A's. Returns the accepted trio and driver B's bid id.
async fn assigned_load(db: &SqliteDatabase) -> (AcceptedBid, i64) {
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());
    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let bid_a = bids.place_bid(sample_bid(load.id, DRIVER_A, 17_000)).await.unwrap();
    let bid_b = bids.place_bid(sample_bid(load.id, DRIVER_B, 18_500)).await.unwrap();
    let accepted = bids.accept_bid(bid_a.id, SHIPPER).await.unwrap();
    (accepted, bid_b.id)
}

#[tokio::test]
async fn cancelling_a_trip_rolls_all_three_entities_back() {
    let db = setup().await;
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());
    let (accepted, other_bid) = assigned_load(&db).await;

    let cancellation =
        trips.cancel_trip(accepted.trip.id, DRIVER_A, "Truck broke down outside Bloemfontein").await.unwrap();
    assert_eq!(cancellation.trip.status, TripStatus::Cancelled);
    assert_eq!(cancellation.load.status, LoadStatus::Open);
    assert_eq!(cancellation.bid.status, BidStatus::Pending);
    assert_eq!(cancellation.trip.cancellation_reason.as_deref(), Some("Truck broke down outside Bloemfontein"));

    // The load is open again, so the other pending bid can now be accepted
    let accepted_b = bids.accept_bid(other_bid, SHIPPER).await.expect("re-accepting after a cancellation must work");
    assert_eq!(accepted_b.trip.driver_id, DRIVER_B);
    assert_eq!(accepted_b.load.status, LoadStatus::Assigned);

    // And the cancelled trip is not resurrected as the load's live trip
    let live = db.fetch_trip_for_load(accepted.load.id).await.unwrap().unwrap();
    assert_eq!(live.id, accepted_b.trip.id);
}

#[tokio::test]
async fn the_owner_may_also_cancel_a_trip() {
    let db = setup().await;
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());
    let (accepted, _) = assigned_load(&db).await;
    let cancellation = trips.cancel_trip(accepted.trip.id, SHIPPER, "Found a cheaper option").await.unwrap();
    assert_eq!(cancellation.load.status, LoadStatus::Open);
}

#[tokio::test]
async fn strangers_may_not_touch_a_trip() {
    let db = setup().await;
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());
    let (accepted, _) = assigned_load(&db).await;

    let err = trips.cancel_trip(accepted.trip.id, STRANGER, "mine now").await.expect_err("stranger cancel");
    assert!(matches!(err, MarketplaceError::Unauthorized(_)));
    let err = trips.start_trip(accepted.trip.id, DRIVER_B, None).await.expect_err("wrong driver start");
    assert!(matches!(err, MarketplaceError::Unauthorized(_)));
    let err = trips.attach_pickup_proof(accepted.trip.id, STRANGER, "s3://x").await.expect_err("stranger proof");
    assert!(matches!(err, MarketplaceError::Unauthorized(_)));
}

#[tokio::test]
async fn a_completed_trip_cannot_be_cancelled() {
    let db = setup().await;
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());
    let (accepted, _) = assigned_load(&db).await;
    trips.start_trip(accepted.trip.id, DRIVER_A, None).await.unwrap();
    trips
        .complete_trip(accepted.trip.id, DRIVER_A, CompleteTripRequest::default().with_delivery_proof("s3://pod"))
        .await
        .unwrap();
    let err = trips.cancel_trip(accepted.trip.id, SHIPPER, "too late").await.expect_err("cancel after completion");
    assert!(matches!(err, MarketplaceError::InvalidState(_)));
}

#[tokio::test]
async fn completion_requires_a_delivery_proof() {
    let db = setup().await;
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());
    let (accepted, _) = assigned_load(&db).await;
    trips.start_trip(accepted.trip.id, DRIVER_A, None).await.unwrap();

    let err = trips
        .complete_trip(accepted.trip.id, DRIVER_A, CompleteTripRequest::default())
        .await
        .expect_err("completion without proof");
    assert!(matches!(err, MarketplaceError::Validation(_)));

    // A proof attached earlier in the trip satisfies the requirement
    trips.attach_delivery_proof(accepted.trip.id, DRIVER_A, "s3://pod-early", None).await.unwrap();
    let completed = trips.complete_trip(accepted.trip.id, DRIVER_A, CompleteTripRequest::default()).await.unwrap();
    assert_eq!(completed.trip.delivery_proof_uri.as_deref(), Some("s3://pod-early"));
}

#[tokio::test]
async fn a_trip_cannot_start_before_the_pickup_date() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());

    let mut new_load = sample_load(SHIPPER);
    new_load.pickup_date = Utc::now() + Duration::days(2);
    new_load.delivery_date = Utc::now() + Duration::days(4);
    let load = loads.create_load(new_load).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let bid = bids.place_bid(sample_bid(load.id, DRIVER_A, 15_000)).await.unwrap();
    let accepted = bids.accept_bid(bid.id, SHIPPER).await.unwrap();

    let err = trips.start_trip(accepted.trip.id, DRIVER_A, None).await.expect_err("early start");
    assert!(matches!(err, MarketplaceError::InvalidState(_)));
    let trip = db.fetch_trip(accepted.trip.id).await.unwrap().unwrap();
    assert_eq!(trip.status, TripStatus::Scheduled);
}

#[tokio::test]
async fn the_route_log_is_append_only_and_ordered() {
    let db = setup().await;
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());
    let (accepted, _) = assigned_load(&db).await;
    trips.start_trip(accepted.trip.id, DRIVER_A, None).await.unwrap();

    let samples =
        [GeoPoint { lat: -26.20, lng: 28.05 }, GeoPoint { lat: -27.65, lng: 27.23 }, GeoPoint { lat: -29.12, lng: 26.21 }];
    for p in samples {
        trips.record_location(accepted.trip.id, DRIVER_A, p).await.unwrap();
    }
    let route = trips.fetch_route(accepted.trip.id).await.unwrap();
    assert_eq!(route.len(), 3);
    for (point, sample) in route.iter().zip(samples.iter()) {
        assert_eq!((point.lat, point.lng), (sample.lat, sample.lng));
    }
    // Recording against a scheduled or completed trip is refused
    trips
        .complete_trip(accepted.trip.id, DRIVER_A, CompleteTripRequest::default().with_delivery_proof("s3://pod"))
        .await
        .unwrap();
    let err = trips
        .record_location(accepted.trip.id, DRIVER_A, GeoPoint { lat: -33.9, lng: 18.4 })
        .await
        .expect_err("location after completion");
    assert!(matches!(err, MarketplaceError::InvalidState(_)));
    assert_eq!(trips.fetch_route(accepted.trip.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn an_assigned_load_is_frozen_for_its_owner() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let (accepted, _) = assigned_load(&db).await;

    let update = UpdateLoadRequest::default().with_weight_kg(9_000.0);
    let err = loads.update_load(accepted.load.id, SHIPPER, update).await.expect_err("edit while assigned");
    assert!(matches!(err, MarketplaceError::InvalidState(_)));

    let err = loads.cancel_load(accepted.load.id, SHIPPER, "changed my mind").await.expect_err("cancel while assigned");
    assert!(matches!(err, MarketplaceError::InvalidState(_)));

    let err = loads.delete_load(accepted.load.id, SHIPPER).await.expect_err("delete while assigned");
    assert!(matches!(err, MarketplaceError::InvalidState(_)));
}

#[tokio::test]
async fn only_the_owner_may_manage_their_load() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();

    let err = loads.publish_load(load.id, STRANGER).await.expect_err("stranger publish");
    assert!(matches!(err, MarketplaceError::Unauthorized(_)));
    let err = loads.delete_load(load.id, STRANGER).await.expect_err("stranger delete");
    assert!(matches!(err, MarketplaceError::Unauthorized(_)));
}

#[tokio::test]
async fn owners_cannot_bid_on_their_own_loads() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());
    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let err = bids.place_bid(sample_bid(load.id, SHIPPER, 1)).await.expect_err("self-bid");
    assert!(matches!(err, MarketplaceError::Validation(_)));
}
