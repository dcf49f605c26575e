//! End-to-end walk through the happy path: draft → publish → bids → accept → trip → delivered.

use freightmatch_engine::{
    db_types::{BidStatus, GeoPoint, LoadStatus, QuotaKind, SubscriptionTier, TripStatus},
    events::EventProducers,
    market_objects::{CompleteTripRequest, LoadQueryFilter},
    test_utils::{prepare_test_env, random_db_path, sample_bid, sample_load},
    BidFlowApi,
    LoadFlowApi,
    MarketplaceReader,
    QuotaApi,
    SqliteDatabase,
    TripFlowApi,
};

const SHIPPER: i64 = 100;
const DRIVER_A: i64 = 200;
const DRIVER_B: i64 = 201;

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url).await.expect("Error creating database");
    let quotas = QuotaApi::new(db.clone());
    quotas.set_tier(SHIPPER, SubscriptionTier::Free).await.expect("Error provisioning shipper");
    quotas.set_tier(DRIVER_A, SubscriptionTier::Pro).await.expect("Error provisioning driver A");
    quotas.set_tier(DRIVER_B, SubscriptionTier::Free).await.expect("Error provisioning driver B");
    db
}

#[tokio::test]
async fn full_lifecycle_from_draft_to_delivered() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());
    let trips = TripFlowApi::new(db.clone(), EventProducers::default());

    // Draft creation is free and invisible to drivers
    let load = loads.create_load(sample_load(SHIPPER)).await.expect("Error creating draft");
    assert_eq!(load.status, LoadStatus::Draft);
    assert!(load.published_at.is_none());

    let load = loads.publish_load(load.id, SHIPPER).await.expect("Error publishing load");
    assert_eq!(load.status, LoadStatus::Open);
    assert!(load.published_at.is_some());

    // The publish consumed the Free tier's single monthly load
    let status = QuotaApi::new(db.clone()).quota_status(SHIPPER, QuotaKind::Load).await.unwrap();
    assert_eq!(status.used, 1);
    assert_eq!(status.limit, Some(1));
    assert!(status.is_exhausted());

    let bid_a = bids.place_bid(sample_bid(load.id, DRIVER_A, 17_000)).await.expect("Error placing bid A");
    let bid_b = bids.place_bid(sample_bid(load.id, DRIVER_B, 16_250)).await.expect("Error placing bid B");
    assert_eq!(bid_a.status, BidStatus::Pending);
    assert_eq!(bid_b.status, BidStatus::Pending);

    // Closing bidding blocks new bids but existing ones can still be accepted
    let load = loads.close_bidding(load.id, SHIPPER).await.expect("Error closing bidding");
    assert_eq!(load.status, LoadStatus::BiddingClosed);
    let late = bids.place_bid(sample_bid(load.id, DRIVER_A, 15_000)).await;
    assert!(late.is_err(), "A bid after bidding closed should be refused");

    let accepted = bids.accept_bid(bid_b.id, SHIPPER).await.expect("Error accepting bid");
    assert_eq!(accepted.load.status, LoadStatus::Assigned);
    assert_eq!(accepted.bid.status, BidStatus::Accepted);
    assert_eq!(accepted.trip.status, TripStatus::Scheduled);
    assert_eq!(accepted.trip.agreed_price, bid_b.amount);
    assert_eq!(accepted.trip.driver_id, DRIVER_B);

    // The losing bid is left pending, not rejected
    let bid_a = db.fetch_bid(bid_a.id).await.unwrap().unwrap();
    assert_eq!(bid_a.status, BidStatus::Pending);

    let trip = trips
        .start_trip(accepted.trip.id, DRIVER_B, Some(GeoPoint { lat: -26.2041, lng: 28.0473 }))
        .await
        .expect("Error starting trip");
    assert_eq!(trip.status, TripStatus::InProgress);
    assert!(trip.start_time.is_some());
    let load = db.fetch_load(load.id).await.unwrap().unwrap();
    assert_eq!(load.status, LoadStatus::InTransit);

    trips
        .record_location(trip.id, DRIVER_B, GeoPoint { lat: -29.85, lng: 26.15 })
        .await
        .expect("Error recording location");
    trips.attach_pickup_proof(trip.id, DRIVER_B, "s3://proofs/pickup-1.jpg").await.expect("Error attaching proof");

    let request = CompleteTripRequest::default()
        .with_delivery_proof("s3://proofs/pod-1.jpg")
        .with_signature("s3://proofs/sig-1.png")
        .with_payment_method("EFT");
    let completed = trips.complete_trip(trip.id, DRIVER_B, request).await.expect("Error completing trip");
    assert_eq!(completed.trip.status, TripStatus::Completed);
    assert!(completed.trip.end_time.is_some());
    assert_eq!(completed.load.status, LoadStatus::Delivered);

    // The starting location plus one sample
    let route = trips.fetch_route(trip.id).await.unwrap();
    assert_eq!(route.len(), 2);
    assert!(route[0].recorded_at <= route[1].recorded_at);
}

#[tokio::test]
async fn drafts_are_invisible_to_load_searches_by_status() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let draft = loads.create_load(sample_load(SHIPPER)).await.unwrap();

    let open = db.search_loads(LoadQueryFilter::default().with_status(LoadStatus::Open)).await.unwrap();
    assert!(open.is_empty());

    loads.publish_load(draft.id, SHIPPER).await.unwrap();
    let open = db.search_loads(LoadQueryFilter::default().with_status(LoadStatus::Open)).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, draft.id);
}

#[tokio::test]
async fn a_create_is_immediately_visible_to_the_following_publish() {
    let db = setup().await;
    QuotaApi::new(db.clone()).set_tier(300, SubscriptionTier::Pro).await.unwrap();
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());

    // Back-to-back create/publish pairs must never lose sight of the freshly inserted row
    for i in 0..10 {
        let draft = loads.create_load(sample_load(300)).await.unwrap();
        let published = loads
            .publish_load(draft.id, 300)
            .await
            .unwrap_or_else(|e| panic!("publish {i} failed for a load that was just created: {e:?}"));
        assert_eq!(published.status, LoadStatus::Open);
    }
}

#[tokio::test]
async fn an_empty_status_list_is_no_status_filter_at_all() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    loads.publish_load(load.id, SHIPPER).await.unwrap();

    let filter = LoadQueryFilter { status: Some(vec![]), ..Default::default() };
    assert!(filter.is_empty());
    let found = db.search_loads(filter).await.expect("an empty status list must not break the query");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, load.id);
}

#[tokio::test]
async fn view_counter_accumulates() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    for _ in 0..3 {
        loads.record_load_view(load.id).await.unwrap();
    }
    let load = db.fetch_load(load.id).await.unwrap().unwrap();
    assert_eq!(load.view_count, 3);
}

#[tokio::test]
async fn deleting_a_draft_cascades_to_bids() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());
    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let bid = bids.place_bid(sample_bid(load.id, DRIVER_A, 20_000)).await.unwrap();

    loads.delete_load(load.id, SHIPPER).await.expect("Error deleting load");
    assert!(db.fetch_load(load.id).await.unwrap().is_none());
    assert!(db.fetch_bid(bid.id).await.unwrap().is_none());
}
