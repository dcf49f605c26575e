//! Subscription records and the quota ledger.
//!
//! [`reserve_quota`] is the heart of the ledger. It must always run on the same transaction as the guarded action
//! (publishing a load, placing a bid) so that the roll-check-increment sequence commits or rolls back together
//! with it. Two concurrent requests then cannot both observe "allowed" before either increments.

use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{QuotaKind, Subscription, SubscriptionTier},
    helpers::roll_if_new_period,
    traits::MarketplaceError,
};

pub async fn fetch_subscription(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Subscription>, sqlx::Error> {
    let sub =
        sqlx::query_as("SELECT * FROM subscriptions WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(sub)
}

/// Creates the subscription record, or changes its tier if one exists. Counters survive a tier change.
pub(crate) async fn upsert_subscription(
    user_id: i64,
    tier: SubscriptionTier,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Subscription, MarketplaceError> {
    let sub: Subscription = sqlx::query_as(
        r#"
            INSERT INTO subscriptions (user_id, tier, last_reset) VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET tier = excluded.tier, updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(tier)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("📇️ Subscription for user {user_id} upserted at tier {tier}");
    Ok(sub)
}

/// Checks the user's quota for `kind` and, when allowed, consumes one unit — rolling the counters first if the
/// calendar month has changed since `last_reset`. Returns the subscription as written.
///
/// Must be called with the transaction of the guarded action, never with a bare pool connection.
pub(crate) async fn reserve_quota(
    user_id: i64,
    kind: QuotaKind,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Subscription, MarketplaceError> {
    let sub = fetch_subscription(user_id, conn)
        .await?
        .ok_or(MarketplaceError::SubscriptionNotFound(user_id))?;
    let counters = roll_if_new_period(sub.counters(), now);
    let used = match kind {
        QuotaKind::Load => counters.loads_posted,
        QuotaKind::Bid => counters.bids_placed,
    };
    if let Some(limit) = sub.tier.limit_for(kind) {
        if used >= limit {
            trace!("📇️ User {user_id} denied: {kind} quota {used}/{limit} on tier {}", sub.tier);
            let upgrade_hint = match sub.tier.upgrade_hint() {
                Some(tier) => format!("Upgrade to the {tier} plan for unlimited {kind}s."),
                None => format!("The {kind} limit for the {} plan has been reached.", sub.tier),
            };
            return Err(MarketplaceError::QuotaExceeded { kind, limit, used, upgrade_hint });
        }
    }
    let (loads_posted, bids_placed) = match kind {
        QuotaKind::Load => (counters.loads_posted + 1, counters.bids_placed),
        QuotaKind::Bid => (counters.loads_posted, counters.bids_placed + 1),
    };
    let sub: Subscription = sqlx::query_as(
        "UPDATE subscriptions SET loads_posted = $1, bids_placed = $2, last_reset = $3, updated_at = \
         CURRENT_TIMESTAMP WHERE user_id = $4 RETURNING *",
    )
    .bind(loads_posted)
    .bind(bids_placed)
    .bind(counters.last_reset)
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    debug!("📇️ User {user_id} reserved one {kind}: now {}/{:?}", sub.used_for(kind), sub.tier.limit_for(kind));
    Ok(sub)
}
