//! # SQLite database methods
//!
//! This module contains the "low-level" SQLite interactions for the marketplace engine.
//!
//! All interactions are maintained as simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or create an atomic transaction
//! as the need arises and call through to the functions without any other changes. Multi-entity invariants are
//! enforced one level up, in [`super::SqliteDatabase`], which composes these functions inside transactions.

use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod bids;
pub mod loads;
pub mod saved_searches;
pub mod subscriptions;
pub mod trips;

const SQLITE_DB_URL: &str = "sqlite://data/freightmatch.db";

pub fn db_url() -> String {
    let result = env::var("FMX_DATABASE_URL").unwrap_or_else(|_| {
        info!("FMX_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// All engine access shares a single SQLite connection.
///
/// Guarded status transitions re-read entity state inside a fresh transaction, so every transaction must observe
/// the most recent commit. Pooled WAL connections do not guarantee that — a transaction begun on one pooled
/// connection can miss a row just committed on another — so writers queue on the one connection instead of racing
/// stale snapshots.
pub async fn new_pool(url: &str) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
    Ok(pool)
}
