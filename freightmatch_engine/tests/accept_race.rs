//! Exercises the single-winner guarantee: when two accepts race on the same load, exactly one trip is created.

use freightmatch_engine::{
    db_types::{BidStatus, LoadStatus, SubscriptionTier, TripStatus},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path, sample_bid, sample_load},
    BidFlowApi,
    LoadFlowApi,
    MarketplaceReader,
    QuotaApi,
    SqliteDatabase,
};

const SHIPPER: i64 = 100;

async fn setup(n_drivers: i64) -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url).await.expect("Error creating database");
    let quotas = QuotaApi::new(db.clone());
    quotas.set_tier(SHIPPER, SubscriptionTier::Pro).await.expect("Error provisioning shipper");
    for i in 0..n_drivers {
        quotas.set_tier(200 + i, SubscriptionTier::Pro).await.expect("Error provisioning driver");
    }
    db
}

#[tokio::test]
async fn concurrent_accepts_produce_exactly_one_trip() {
    let db = setup(2).await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());

    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let bid_1 = bids.place_bid(sample_bid(load.id, 200, 17_500)).await.unwrap();
    let bid_2 = bids.place_bid(sample_bid(load.id, 201, 16_000)).await.unwrap();

    let api_1 = BidFlowApi::new(db.clone(), EventProducers::default());
    let api_2 = BidFlowApi::new(db.clone(), EventProducers::default());
    let (res_1, res_2) = tokio::join!(api_1.accept_bid(bid_1.id, SHIPPER), api_2.accept_bid(bid_2.id, SHIPPER));

    // Exactly one accept wins. The loser sees a conflict (or, under heavy write contention, a database error);
    // either way nothing of its transaction is visible.
    let winners = [res_1.is_ok(), res_2.is_ok()].iter().filter(|w| **w).count();
    assert_eq!(winners, 1, "exactly one accept must win: {res_1:?} / {res_2:?}");

    let load = db.fetch_load(load.id).await.unwrap().unwrap();
    assert_eq!(load.status, LoadStatus::Assigned);

    let trip = db.fetch_trip_for_load(load.id).await.unwrap().expect("the winner's trip must exist");
    assert_eq!(trip.status, TripStatus::Scheduled);

    // The winning bid is Accepted, the losing bid untouched
    let (b1, b2) =
        (db.fetch_bid(bid_1.id).await.unwrap().unwrap(), db.fetch_bid(bid_2.id).await.unwrap().unwrap());
    let statuses = [b1.status, b2.status];
    assert!(statuses.contains(&BidStatus::Accepted));
    assert!(statuses.contains(&BidStatus::Pending));
    assert_eq!(trip.bid_id, if b1.status == BidStatus::Accepted { b1.id } else { b2.id });
}

#[tokio::test]
async fn a_burst_of_accepts_still_yields_one_winner() {
    let db = setup(8).await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());

    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let mut bid_ids = Vec::new();
    for i in 0..8 {
        let bid = bids.place_bid(sample_bid(load.id, 200 + i, 15_000 + i * 250)).await.unwrap();
        bid_ids.push(bid.id);
    }

    let accepts = bid_ids.iter().map(|&bid_id| {
        let api = BidFlowApi::new(db.clone(), EventProducers::default());
        async move { api.accept_bid(bid_id, SHIPPER).await }
    });
    let results = futures_util::future::join_all(accepts).await;
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "the burst must produce exactly one trip");

    let all_bids = db.fetch_bids_for_load(load.id).await.unwrap();
    let accepted = all_bids.iter().filter(|b| b.status == BidStatus::Accepted).count();
    assert_eq!(accepted, 1);
    assert!(db.fetch_trip_for_load(load.id).await.unwrap().is_some());
}

#[tokio::test]
async fn a_sequential_second_accept_is_rejected_cleanly() {
    let db = setup(2).await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());

    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let bid_1 = bids.place_bid(sample_bid(load.id, 200, 17_500)).await.unwrap();
    let bid_2 = bids.place_bid(sample_bid(load.id, 201, 16_000)).await.unwrap();

    bids.accept_bid(bid_1.id, SHIPPER).await.expect("first accept should succeed");
    let err = bids.accept_bid(bid_2.id, SHIPPER).await.expect_err("second accept should fail");
    // The load is no longer in a bid-accepting state, so this is a state error rather than a race loss
    assert!(
        matches!(err, freightmatch_engine::MarketplaceError::InvalidState(_)),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn a_driver_cannot_hold_two_live_bids_on_one_load() {
    let db = setup(1).await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());

    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    bids.place_bid(sample_bid(load.id, 200, 17_500)).await.unwrap();
    let err = bids.place_bid(sample_bid(load.id, 200, 16_000)).await.expect_err("second live bid should be refused");
    assert!(matches!(err, freightmatch_engine::MarketplaceError::Conflict(_)), "unexpected error: {err:?}");

    // After withdrawing, the driver may bid again
    let mine = db.fetch_bids_for_driver(200).await.unwrap();
    let bids_api = BidFlowApi::new(db.clone(), EventProducers::default());
    bids_api.withdraw_bid(mine[0].id, 200).await.unwrap();
    bids_api.place_bid(sample_bid(load.id, 200, 16_000)).await.expect("a fresh bid after withdrawal should work");
}
