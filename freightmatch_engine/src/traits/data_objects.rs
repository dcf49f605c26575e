use serde::{Deserialize, Serialize};

use crate::db_types::{Bid, Load, QuotaKind, SubscriptionTier, Trip};

/// The result of a successful bid acceptance: all three records as they stand after the transaction committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedBid {
    pub bid: Bid,
    pub load: Load,
    pub trip: Trip,
}

/// The result of a successful trip completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTrip {
    pub trip: Trip,
    pub load: Load,
}

/// The result of a trip cancellation. The load has been reopened and the originating bid returned to `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripCancellation {
    pub trip: Trip,
    pub load: Load,
    pub bid: Bid,
}

/// A read-only view of a user's quota position for one kind of guarded action. Counters are reported as they would
/// stand *after* a lazy period roll, without writing anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub kind: QuotaKind,
    pub tier: SubscriptionTier,
    /// `None` means unlimited.
    pub limit: Option<i64>,
    pub used: i64,
}

impl QuotaStatus {
    pub fn remaining(&self) -> Option<i64> {
        self.limit.map(|l| (l - self.used).max(0))
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.remaining(), Some(0))
    }
}
