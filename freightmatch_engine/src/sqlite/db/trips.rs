use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Bid, GeoPoint, Load, RoutePoint, Trip},
    fme_api::market_objects::CompleteTripRequest,
    traits::MarketplaceError,
};

/// Creates the trip record for an accepted bid, in `Scheduled` status, with the agreed price snapshotted from the
/// bid. The partial unique indices on `load_id` and `bid_id` (cancelled trips exempt) are the storage-level
/// backstop for the one-live-trip-per-load invariant; hitting them means a race slipped past the status guards.
pub(crate) async fn insert_trip(load: &Load, bid: &Bid, conn: &mut SqliteConnection) -> Result<Trip, MarketplaceError> {
    let trip: Trip = sqlx::query_as(
        r#"
            INSERT INTO trips (load_id, bid_id, driver_id, agreed_price)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(load.id)
    .bind(bid.id)
    .bind(bid.driver_id)
    .bind(bid.amount.value())
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.message().contains("UNIQUE") => {
            MarketplaceError::Conflict(format!("A trip already exists for load {}", load.id))
        },
        e => e.into(),
    })?;
    debug!("🛣️ Trip {} created for load {} (bid {})", trip.id, load.id, bid.id);
    Ok(trip)
}

pub async fn fetch_trip(trip_id: i64, conn: &mut SqliteConnection) -> Result<Option<Trip>, sqlx::Error> {
    let trip = sqlx::query_as("SELECT * FROM trips WHERE id = $1").bind(trip_id).fetch_optional(conn).await?;
    Ok(trip)
}

/// The load's live trip. Cancelled trips are ignored; at most one non-cancelled trip can exist per load.
pub async fn fetch_trip_for_load(load_id: i64, conn: &mut SqliteConnection) -> Result<Option<Trip>, sqlx::Error> {
    let trip = sqlx::query_as("SELECT * FROM trips WHERE load_id = $1 AND status != 'Cancelled' LIMIT 1")
        .bind(load_id)
        .fetch_optional(conn)
        .await?;
    Ok(trip)
}

/// `Scheduled → InProgress`, stamping the start time. Guarded; `None` means the trip was not in `Scheduled`.
pub(crate) async fn start_trip_guarded(
    trip_id: i64,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Trip>, MarketplaceError> {
    let trip: Option<Trip> = sqlx::query_as(
        "UPDATE trips SET status = 'InProgress', start_time = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND \
         status = 'Scheduled' RETURNING *",
    )
    .bind(now)
    .bind(trip_id)
    .fetch_optional(conn)
    .await?;
    trace!("🛣️ Guarded start of trip {trip_id}: matched={}", trip.is_some());
    Ok(trip)
}

/// Replaces the trip's current location. The route log is written separately via [`append_route_point`].
pub(crate) async fn set_current_location(
    trip_id: i64,
    location: GeoPoint,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Trip>, MarketplaceError> {
    let trip: Option<Trip> = sqlx::query_as(
        "UPDATE trips SET current_lat = $1, current_lng = $2, location_updated_at = $3, updated_at = \
         CURRENT_TIMESTAMP WHERE id = $4 AND status = 'InProgress' RETURNING *",
    )
    .bind(location.lat)
    .bind(location.lng)
    .bind(now)
    .bind(trip_id)
    .fetch_optional(conn)
    .await?;
    Ok(trip)
}

/// Appends one sample to the trip's route log. Samples are immutable once written.
pub(crate) async fn append_route_point(
    trip_id: i64,
    location: GeoPoint,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<RoutePoint, MarketplaceError> {
    let point: RoutePoint = sqlx::query_as(
        "INSERT INTO trip_route_points (trip_id, lat, lng, recorded_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(trip_id)
    .bind(location.lat)
    .bind(location.lng)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(point)
}

pub async fn fetch_route(trip_id: i64, conn: &mut SqliteConnection) -> Result<Vec<RoutePoint>, sqlx::Error> {
    let route = sqlx::query_as("SELECT * FROM trip_route_points WHERE trip_id = $1 ORDER BY recorded_at ASC, id ASC")
        .bind(trip_id)
        .fetch_all(conn)
        .await?;
    Ok(route)
}

pub(crate) async fn attach_pickup_proof(
    trip_id: i64,
    uri: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Trip>, MarketplaceError> {
    let trip: Option<Trip> = sqlx::query_as(
        "UPDATE trips SET pickup_proof_uri = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = \
         'InProgress' RETURNING *",
    )
    .bind(uri)
    .bind(trip_id)
    .fetch_optional(conn)
    .await?;
    Ok(trip)
}

pub(crate) async fn attach_delivery_proof(
    trip_id: i64,
    uri: &str,
    signature_uri: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Trip>, MarketplaceError> {
    let trip: Option<Trip> = sqlx::query_as(
        "UPDATE trips SET delivery_proof_uri = $1, signature_uri = COALESCE($2, signature_uri), updated_at = \
         CURRENT_TIMESTAMP WHERE id = $3 AND status = 'InProgress' RETURNING *",
    )
    .bind(uri)
    .bind(signature_uri)
    .bind(trip_id)
    .fetch_optional(conn)
    .await?;
    Ok(trip)
}

/// `InProgress → Completed`, stamping the end time and closing details. The delivery-proof requirement is checked
/// by the caller before this runs; the proof columns are only overwritten when the request supplies them.
pub(crate) async fn complete_trip_guarded(
    trip_id: i64,
    request: &CompleteTripRequest,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Trip>, MarketplaceError> {
    let trip: Option<Trip> = sqlx::query_as(
        "UPDATE trips SET status = 'Completed', end_time = $1, delivery_proof_uri = COALESCE($2, \
         delivery_proof_uri), signature_uri = COALESCE($3, signature_uri), payment_method = COALESCE($4, \
         payment_method), notes = COALESCE($5, notes), updated_at = CURRENT_TIMESTAMP WHERE id = $6 AND status = \
         'InProgress' RETURNING *",
    )
    .bind(now)
    .bind(request.delivery_proof_uri.as_deref())
    .bind(request.signature_uri.as_deref())
    .bind(request.payment_method.as_deref())
    .bind(request.notes.as_deref())
    .bind(trip_id)
    .fetch_optional(conn)
    .await?;
    trace!("🛣️ Guarded completion of trip {trip_id}: matched={}", trip.is_some());
    Ok(trip)
}

/// `Scheduled|InProgress → Cancelled` with a reason. Guarded; `None` means the trip was already terminal.
pub(crate) async fn cancel_trip_guarded(
    trip_id: i64,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Trip>, MarketplaceError> {
    let trip: Option<Trip> = sqlx::query_as(
        "UPDATE trips SET status = 'Cancelled', cancellation_reason = $1, updated_at = CURRENT_TIMESTAMP WHERE id = \
         $2 AND status IN ('Scheduled','InProgress') RETURNING *",
    )
    .bind(reason)
    .bind(trip_id)
    .fetch_optional(conn)
    .await?;
    trace!("🛣️ Guarded cancellation of trip {trip_id}: matched={}", trip.is_some());
    Ok(trip)
}
