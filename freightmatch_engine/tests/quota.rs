//! Monthly quota ledger behaviour: Free tier limits, lazy period rollover, tier upgrades.

use chrono::{Duration, Utc};
use freightmatch_engine::{
    db_types::{QuotaKind, SubscriptionTier},
    events::EventProducers,
    test_utils::{backdate_last_reset, prepare_test_env, random_db_path, sample_bid, sample_load},
    BidFlowApi,
    LoadFlowApi,
    MarketplaceError,
    QuotaApi,
    SqliteDatabase,
};

const SHIPPER: i64 = 100;
const DRIVER: i64 = 200;

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url).await.expect("Error creating database")
}

#[tokio::test]
async fn free_tier_allows_one_load_per_month() {
    let db = setup().await;
    QuotaApi::new(db.clone()).set_tier(SHIPPER, SubscriptionTier::Free).await.unwrap();
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());

    let first = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    loads.publish_load(first.id, SHIPPER).await.expect("the first publish of the month should succeed");

    // Drafting is still free, publishing is not
    let second = loads.create_load(sample_load(SHIPPER)).await.expect("drafts are not metered");
    let err = loads.publish_load(second.id, SHIPPER).await.expect_err("the second publish should be refused");
    match err {
        MarketplaceError::QuotaExceeded { kind, limit, used, upgrade_hint } => {
            assert_eq!(kind, QuotaKind::Load);
            assert_eq!(limit, 1);
            assert_eq!(used, 1);
            assert!(upgrade_hint.contains("Pro"), "the hint should nudge towards Pro: {upgrade_hint}");
        },
        e => panic!("Expected QuotaExceeded, got {e:?}"),
    }

    // A failed publish leaves the draft untouched
    let second = freightmatch_engine::MarketplaceReader::fetch_load(&db, second.id).await.unwrap().unwrap();
    assert_eq!(second.status, freightmatch_engine::db_types::LoadStatus::Draft);
}

#[tokio::test]
async fn free_tier_allows_three_bids_per_month() {
    let db = setup().await;
    let quotas = QuotaApi::new(db.clone());
    quotas.set_tier(SHIPPER, SubscriptionTier::Fleet).await.unwrap();
    quotas.set_tier(DRIVER, SubscriptionTier::Free).await.unwrap();
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let bids = BidFlowApi::new(db.clone(), EventProducers::default());

    // Three loads so that the one-live-bid-per-load rule doesn't interfere
    for _ in 0..3 {
        let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
        let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
        bids.place_bid(sample_bid(load.id, DRIVER, 10_000)).await.expect("a bid within quota should succeed");
    }
    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    let load = loads.publish_load(load.id, SHIPPER).await.unwrap();
    let err = bids.place_bid(sample_bid(load.id, DRIVER, 10_000)).await.expect_err("the fourth bid should be refused");
    assert!(matches!(err, MarketplaceError::QuotaExceeded { kind: QuotaKind::Bid, limit: 3, used: 3, .. }));
}

#[tokio::test]
async fn counters_roll_over_lazily_in_a_new_month() {
    let db = setup().await;
    QuotaApi::new(db.clone()).set_tier(SHIPPER, SubscriptionTier::Free).await.unwrap();
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());

    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    loads.publish_load(load.id, SHIPPER).await.unwrap();

    // Pretend the publish happened last month
    backdate_last_reset(&db, SHIPPER, Utc::now() - Duration::days(40)).await;

    let status = QuotaApi::new(db.clone()).quota_status(SHIPPER, QuotaKind::Load).await.unwrap();
    assert_eq!(status.used, 0, "the virtual roll should zero the counter");
    assert_eq!(status.remaining(), Some(1));

    let next = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    loads.publish_load(next.id, SHIPPER).await.expect("a new month grants a fresh quota");

    let sub = freightmatch_engine::MarketplaceReader::fetch_subscription(&db, SHIPPER).await.unwrap().unwrap();
    assert_eq!(sub.loads_posted, 1, "the roll plus one reservation");
}

#[tokio::test]
async fn operations_without_a_subscription_are_refused() {
    let db = setup().await;
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());
    let load = loads.create_load(sample_load(SHIPPER)).await.expect("drafting needs no subscription");
    let err = loads.publish_load(load.id, SHIPPER).await.expect_err("publishing does");
    assert!(matches!(err, MarketplaceError::SubscriptionNotFound(id) if id == SHIPPER));
}

#[tokio::test]
async fn a_mid_month_upgrade_lifts_the_limit_immediately() {
    let db = setup().await;
    let quotas = QuotaApi::new(db.clone());
    quotas.set_tier(SHIPPER, SubscriptionTier::Free).await.unwrap();
    let loads = LoadFlowApi::new(db.clone(), EventProducers::default());

    let load = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    loads.publish_load(load.id, SHIPPER).await.unwrap();
    let blocked = loads.create_load(sample_load(SHIPPER)).await.unwrap();
    assert!(loads.publish_load(blocked.id, SHIPPER).await.is_err());

    // Counters survive the tier change, but Pro has no load limit
    let sub = quotas.set_tier(SHIPPER, SubscriptionTier::Pro).await.unwrap();
    assert_eq!(sub.loads_posted, 1);
    loads.publish_load(blocked.id, SHIPPER).await.expect("Pro publishes are unmetered");

    let status = quotas.quota_status(SHIPPER, QuotaKind::Load).await.unwrap();
    assert_eq!(status.limit, None);
    assert_eq!(status.used, 2);
    assert!(!status.is_exhausted());
}
