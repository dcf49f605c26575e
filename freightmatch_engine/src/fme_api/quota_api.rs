use std::fmt::Debug;

use chrono::Utc;

use crate::{
    db_types::{QuotaKind, Subscription, SubscriptionTier},
    traits::{MarketplaceDatabase, MarketplaceError, QuotaStatus},
};

/// `QuotaApi` exposes subscription management and read-only quota reporting. Quota *consumption* never goes
/// through here; it happens inside the publish and bid transactions.
pub struct QuotaApi<B> {
    db: B,
}

impl<B> Debug for QuotaApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "QuotaApi")
    }
}

impl<B> QuotaApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> QuotaApi<B>
where B: MarketplaceDatabase
{
    /// Provisions a subscription for a user, or changes the tier of an existing one. Usage counters survive tier
    /// changes, so a mid-month upgrade takes effect immediately against the new (or absent) limits.
    pub async fn set_tier(&self, user_id: i64, tier: SubscriptionTier) -> Result<Subscription, MarketplaceError> {
        self.db.upsert_subscription(user_id, tier).await
    }

    pub async fn subscription(&self, user_id: i64) -> Result<Subscription, MarketplaceError> {
        let sub = self.db.fetch_subscription(user_id).await?;
        sub.ok_or(MarketplaceError::SubscriptionNotFound(user_id))
    }

    /// The user's current position against the monthly limit for `kind`, with the period roll applied virtually.
    /// A `limit` of `None` means unlimited.
    pub async fn quota_status(&self, user_id: i64, kind: QuotaKind) -> Result<QuotaStatus, MarketplaceError> {
        self.db.quota_status(user_id, kind, Utc::now()).await
    }
}
