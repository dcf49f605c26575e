use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Bid, BidStatus, NewBid},
    fme_api::market_objects::UpdateBidRequest,
    traits::MarketplaceError,
};

pub(crate) async fn insert_bid(bid: NewBid, conn: &mut SqliteConnection) -> Result<Bid, MarketplaceError> {
    let bid: Bid = sqlx::query_as(
        r#"
            INSERT INTO bids (
                load_id,
                driver_id,
                vehicle_id,
                amount,
                currency,
                message,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(bid.load_id)
    .bind(bid.driver_id)
    .bind(bid.vehicle_id)
    .bind(bid.amount.value())
    .bind(bid.currency)
    .bind(bid.message)
    .bind(bid.expires_at)
    .fetch_one(conn)
    .await?;
    debug!("🪙️ Bid inserted with id {} against load {}", bid.id, bid.load_id);
    Ok(bid)
}

pub async fn fetch_bid(bid_id: i64, conn: &mut SqliteConnection) -> Result<Option<Bid>, sqlx::Error> {
    let bid = sqlx::query_as("SELECT * FROM bids WHERE id = $1").bind(bid_id).fetch_optional(conn).await?;
    Ok(bid)
}

pub async fn fetch_bids_for_load(load_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Bid>, sqlx::Error> {
    let bids = sqlx::query_as("SELECT * FROM bids WHERE load_id = $1 ORDER BY created_at ASC")
        .bind(load_id)
        .fetch_all(conn)
        .await?;
    Ok(bids)
}

pub async fn fetch_bids_for_driver(driver_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Bid>, sqlx::Error> {
    let bids = sqlx::query_as("SELECT * FROM bids WHERE driver_id = $1 ORDER BY created_at ASC")
        .bind(driver_id)
        .fetch_all(conn)
        .await?;
    Ok(bids)
}

/// Whether the driver already holds a live (pending or accepted) bid against the load.
pub(crate) async fn active_bid_exists(
    load_id: i64,
    driver_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, MarketplaceError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bids WHERE load_id = $1 AND driver_id = $2 AND status IN ('Pending','Accepted')",
    )
    .bind(load_id)
    .bind(driver_id)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

/// Moves the bid from `expected` to `new_status`, recording an optional reason. Returns `None` when the guard did
/// not match, i.e. a concurrent writer got there first.
pub(crate) async fn set_status_guarded(
    bid_id: i64,
    expected: BidStatus,
    new_status: BidStatus,
    reason: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Bid>, MarketplaceError> {
    let bid: Option<Bid> = sqlx::query_as(
        "UPDATE bids SET status = $1, status_reason = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 AND status = \
         $4 RETURNING *",
    )
    .bind(new_status)
    .bind(reason)
    .bind(bid_id)
    .bind(expected)
    .fetch_optional(conn)
    .await?;
    trace!("🪙️ Guarded transition of bid {bid_id} to {new_status}: matched={}", bid.is_some());
    Ok(bid)
}

pub(crate) async fn update_bid(
    bid_id: i64,
    update: UpdateBidRequest,
    conn: &mut SqliteConnection,
) -> Result<Option<Bid>, MarketplaceError> {
    if update.is_empty() {
        debug!("🪙️ No fields to update for bid {bid_id}. Update request skipped.");
        return Err(MarketplaceError::Validation("The update request contains no fields".into()));
    }
    let mut builder = QueryBuilder::new("UPDATE bids SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(amount) = update.amount {
        set_clause.push("amount = ");
        set_clause.push_bind_unseparated(amount.value());
    }
    if let Some(message) = update.message {
        set_clause.push("message = ");
        set_clause.push_bind_unseparated(message);
    }
    if let Some(vehicle_id) = update.vehicle_id {
        set_clause.push("vehicle_id = ");
        set_clause.push_bind_unseparated(vehicle_id);
    }
    if let Some(expires_at) = update.expires_at {
        set_clause.push("expires_at = ");
        set_clause.push_bind_unseparated(expires_at);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(bid_id);
    builder.push(" RETURNING *");
    trace!("🪙️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Bid::from_row(&row)).transpose()?;
    Ok(res)
}

/// Cascade delete used when a load is removed pre-assignment.
pub(crate) async fn delete_bids_for_load(load_id: i64, conn: &mut SqliteConnection) -> Result<u64, MarketplaceError> {
    let res = sqlx::query("DELETE FROM bids WHERE load_id = $1").bind(load_id).execute(conn).await?;
    Ok(res.rows_affected())
}
