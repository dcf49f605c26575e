use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{vehicle_set_to_string, Load, LoadStatus, NewLoad},
    fme_api::market_objects::{LoadQueryFilter, UpdateLoadRequest},
    traits::MarketplaceError,
};

/// Inserts a new load in `Draft` status using the given connection. This is not atomic on its own. You can embed
/// this call inside a transaction by passing `&mut *tx` as the connection argument.
pub(crate) async fn insert_load(load: NewLoad, conn: &mut SqliteConnection) -> Result<Load, MarketplaceError> {
    let vehicles = vehicle_set_to_string(&load.required_vehicles);
    let load: Load = sqlx::query_as(
        r#"
            INSERT INTO loads (
                owner_id,
                cargo_type,
                weight_kg,
                volume_m3,
                pickup_address, pickup_city, pickup_province, pickup_lat, pickup_lng,
                delivery_address, delivery_city, delivery_province, delivery_lat, delivery_lng,
                pickup_date,
                delivery_date,
                suggested_price,
                currency,
                required_vehicles,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *;
        "#,
    )
    .bind(load.owner_id)
    .bind(load.cargo_type)
    .bind(load.weight_kg)
    .bind(load.volume_m3)
    .bind(load.pickup.address)
    .bind(load.pickup.city)
    .bind(load.pickup.province)
    .bind(load.pickup.lat)
    .bind(load.pickup.lng)
    .bind(load.delivery.address)
    .bind(load.delivery.city)
    .bind(load.delivery.province)
    .bind(load.delivery.lat)
    .bind(load.delivery.lng)
    .bind(load.pickup_date)
    .bind(load.delivery_date)
    .bind(load.suggested_price.value())
    .bind(load.currency)
    .bind(vehicles)
    .bind(load.expires_at)
    .fetch_one(conn)
    .await?;
    debug!("🚛️ Load inserted with id {}", load.id);
    Ok(load)
}

pub async fn fetch_load(load_id: i64, conn: &mut SqliteConnection) -> Result<Option<Load>, sqlx::Error> {
    let load = sqlx::query_as("SELECT * FROM loads WHERE id = $1").bind(load_id).fetch_optional(conn).await?;
    Ok(load)
}

/// Moves the load to `new_status` if and only if its current status is one of `allowed`. Returns `None` when the
/// guard did not match — either the row is gone or a concurrent writer changed the status first. This is the
/// optimistic re-check that closes the accept/cancel races.
pub(crate) async fn set_status_guarded(
    load_id: i64,
    allowed: &[LoadStatus],
    new_status: LoadStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Load>, MarketplaceError> {
    let guard = allowed.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
    let sql = format!(
        "UPDATE loads SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status IN ({guard}) \
         RETURNING *"
    );
    let load: Option<Load> = sqlx::query_as(&sql).bind(new_status).bind(load_id).fetch_optional(conn).await?;
    trace!("🚛️ Guarded transition of load {load_id} to {new_status}: matched={}", load.is_some());
    Ok(load)
}

/// The publish transition: `Draft → Open` with `published_at` stamped, guarded on the current status.
pub(crate) async fn publish_load(
    load_id: i64,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Load>, MarketplaceError> {
    let load: Option<Load> = sqlx::query_as(
        "UPDATE loads SET status = 'Open', published_at = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND \
         status = 'Draft' RETURNING *",
    )
    .bind(now)
    .bind(load_id)
    .fetch_optional(conn)
    .await?;
    Ok(load)
}

/// Cancels the load with a reason, guarded on the pre-assignment statuses.
pub(crate) async fn cancel_load(
    load_id: i64,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Load>, MarketplaceError> {
    let load: Option<Load> = sqlx::query_as(
        "UPDATE loads SET status = 'Cancelled', cancellation_reason = $1, updated_at = CURRENT_TIMESTAMP WHERE id = \
         $2 AND status IN ('Draft','Open','BiddingClosed') RETURNING *",
    )
    .bind(reason)
    .bind(load_id)
    .fetch_optional(conn)
    .await?;
    Ok(load)
}

pub(crate) async fn update_load(
    load_id: i64,
    update: UpdateLoadRequest,
    conn: &mut SqliteConnection,
) -> Result<Option<Load>, MarketplaceError> {
    if update.is_empty() {
        debug!("🚛️ No fields to update for load {load_id}. Update request skipped.");
        return Err(MarketplaceError::Validation("The update request contains no fields".into()));
    }
    let mut builder = QueryBuilder::new("UPDATE loads SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(cargo_type) = update.cargo_type {
        set_clause.push("cargo_type = ");
        set_clause.push_bind_unseparated(cargo_type.to_string());
    }
    if let Some(weight_kg) = update.weight_kg {
        set_clause.push("weight_kg = ");
        set_clause.push_bind_unseparated(weight_kg);
    }
    if let Some(volume_m3) = update.volume_m3 {
        set_clause.push("volume_m3 = ");
        set_clause.push_bind_unseparated(volume_m3);
    }
    if let Some(pickup) = update.pickup {
        set_clause.push("pickup_address = ");
        set_clause.push_bind_unseparated(pickup.address);
        set_clause.push("pickup_city = ");
        set_clause.push_bind_unseparated(pickup.city);
        set_clause.push("pickup_province = ");
        set_clause.push_bind_unseparated(pickup.province);
        set_clause.push("pickup_lat = ");
        set_clause.push_bind_unseparated(pickup.lat);
        set_clause.push("pickup_lng = ");
        set_clause.push_bind_unseparated(pickup.lng);
    }
    if let Some(delivery) = update.delivery {
        set_clause.push("delivery_address = ");
        set_clause.push_bind_unseparated(delivery.address);
        set_clause.push("delivery_city = ");
        set_clause.push_bind_unseparated(delivery.city);
        set_clause.push("delivery_province = ");
        set_clause.push_bind_unseparated(delivery.province);
        set_clause.push("delivery_lat = ");
        set_clause.push_bind_unseparated(delivery.lat);
        set_clause.push("delivery_lng = ");
        set_clause.push_bind_unseparated(delivery.lng);
    }
    if let Some(pickup_date) = update.pickup_date {
        set_clause.push("pickup_date = ");
        set_clause.push_bind_unseparated(pickup_date);
    }
    if let Some(delivery_date) = update.delivery_date {
        set_clause.push("delivery_date = ");
        set_clause.push_bind_unseparated(delivery_date);
    }
    if let Some(price) = update.suggested_price {
        set_clause.push("suggested_price = ");
        set_clause.push_bind_unseparated(price.value());
    }
    if let Some(vehicles) = update.required_vehicles {
        set_clause.push("required_vehicles = ");
        set_clause.push_bind_unseparated(vehicle_set_to_string(&vehicles));
    }
    if let Some(expires_at) = update.expires_at {
        set_clause.push("expires_at = ");
        set_clause.push_bind_unseparated(expires_at);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(load_id);
    builder.push(" RETURNING *");
    trace!("🚛️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Load::from_row(&row)).transpose()?;
    Ok(res)
}

pub(crate) async fn delete_load(load_id: i64, conn: &mut SqliteConnection) -> Result<u64, MarketplaceError> {
    let res = sqlx::query("DELETE FROM loads WHERE id = $1").bind(load_id).execute(conn).await?;
    Ok(res.rows_affected())
}

pub(crate) async fn incr_view_count(load_id: i64, conn: &mut SqliteConnection) -> Result<(), MarketplaceError> {
    sqlx::query("UPDATE loads SET view_count = view_count + 1 WHERE id = $1").bind(load_id).execute(conn).await?;
    Ok(())
}

/// Fetches loads according to criteria specified in the `LoadQueryFilter`.
///
/// Resulting loads are ordered by `created_at` in ascending order.
pub async fn search_loads(query: LoadQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Load>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM loads
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(owner_id) = query.owner_id {
        where_clause.push("owner_id = ");
        where_clause.push_bind_unseparated(owner_id);
    }
    if let Some(cargo_type) = query.cargo_type {
        where_clause.push("cargo_type = ");
        where_clause.push_bind_unseparated(cargo_type.to_string());
    }
    if let Some(province) = query.pickup_province {
        where_clause.push("pickup_province = ");
        where_clause.push_bind_unseparated(province);
    }
    if let Some(province) = query.delivery_province {
        where_clause.push("delivery_province = ");
        where_clause.push_bind_unseparated(province);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses = query.status.as_ref().unwrap().iter().map(|s| format!("'{s}'")).collect::<Vec<_>>();
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("🚛️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Load>();
    let loads = query.fetch_all(conn).await?;
    trace!("Result of search_loads: {:?}", loads.len());
    Ok(loads)
}
