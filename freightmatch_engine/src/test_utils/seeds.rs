use chrono::{DateTime, Duration, Utc};
use fmx_common::Money;

use crate::{
    db_types::{CargoType, NewBid, NewLoad, Place},
    SqliteDatabase,
};

pub fn johannesburg() -> Place {
    Place {
        address: "12 Commissioner St".to_string(),
        city: "Johannesburg".to_string(),
        province: "Gauteng".to_string(),
        lat: -26.2041,
        lng: 28.0473,
    }
}

pub fn cape_town() -> Place {
    Place {
        address: "8 Buitengracht St".to_string(),
        city: "Cape Town".to_string(),
        province: "Western Cape".to_string(),
        lat: -33.9249,
        lng: 18.4241,
    }
}

/// A plausible Johannesburg → Cape Town pallet load. The pickup date is in the past so that trips can be started
/// immediately in tests.
pub fn sample_load(owner_id: i64) -> NewLoad {
    NewLoad::new(owner_id, CargoType::GeneralFreight, 4_500.0, johannesburg(), cape_town())
        .with_dates(Utc::now() - Duration::hours(1), Utc::now() + Duration::days(3))
        .with_suggested_price(Money::from_units(18_500))
}

pub fn sample_bid(load_id: i64, driver_id: i64, price_units: i64) -> NewBid {
    NewBid::new(load_id, driver_id, Money::from_units(price_units)).with_message("Can load same day")
}

/// Rewinds a subscription's `last_reset` so that rollover behaviour can be exercised without waiting a month.
pub async fn backdate_last_reset(db: &SqliteDatabase, user_id: i64, to: DateTime<Utc>) {
    sqlx::query("UPDATE subscriptions SET last_reset = $1 WHERE user_id = $2")
        .bind(to)
        .bind(user_id)
        .execute(db.pool())
        .await
        .expect("Error backdating last_reset");
}
