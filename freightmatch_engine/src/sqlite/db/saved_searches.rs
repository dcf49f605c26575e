use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Load, NewSavedSearch, SavedSearch},
    traits::MarketplaceError,
};

pub(crate) async fn insert_saved_search(
    search: NewSavedSearch,
    conn: &mut SqliteConnection,
) -> Result<SavedSearch, MarketplaceError> {
    let search: SavedSearch = sqlx::query_as(
        r#"
            INSERT INTO saved_searches (
                driver_id,
                pickup_province,
                delivery_province,
                vehicle_type,
                min_weight_kg,
                max_weight_kg
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(search.driver_id)
    .bind(search.pickup_province)
    .bind(search.delivery_province)
    .bind(search.vehicle_type)
    .bind(search.min_weight_kg)
    .bind(search.max_weight_kg)
    .fetch_one(conn)
    .await?;
    Ok(search)
}

pub(crate) async fn delete_saved_search(
    search_id: i64,
    driver_id: i64,
    conn: &mut SqliteConnection,
) -> Result<u64, MarketplaceError> {
    let res = sqlx::query("DELETE FROM saved_searches WHERE id = $1 AND driver_id = $2")
        .bind(search_id)
        .bind(driver_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn fetch_saved_searches(
    driver_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<SavedSearch>, sqlx::Error> {
    let searches = sqlx::query_as("SELECT * FROM saved_searches WHERE driver_id = $1 ORDER BY created_at ASC")
        .bind(driver_id)
        .fetch_all(conn)
        .await?;
    Ok(searches)
}

/// Saved searches whose province and weight criteria match the load. The vehicle-set intersection is applied in
/// Rust afterwards, since the load's vehicle requirement is a stored set rather than a scalar column.
pub(crate) async fn searches_matching_load(
    load: &Load,
    conn: &mut SqliteConnection,
) -> Result<Vec<SavedSearch>, MarketplaceError> {
    let candidates: Vec<SavedSearch> = sqlx::query_as(
        r#"
            SELECT * FROM saved_searches
            WHERE (pickup_province IS NULL OR pickup_province = $1)
              AND (delivery_province IS NULL OR delivery_province = $2)
              AND (min_weight_kg IS NULL OR min_weight_kg <= $3)
              AND (max_weight_kg IS NULL OR max_weight_kg >= $3)
            ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(&load.pickup_province)
    .bind(&load.delivery_province)
    .bind(load.weight_kg)
    .fetch_all(conn)
    .await?;
    let matches: Vec<SavedSearch> = candidates.into_iter().filter(|s| s.matches_vehicles(load)).collect();
    trace!("🔔️ {} saved searches match load {}", matches.len(), load.id);
    Ok(matches)
}
