//! Request and query objects accepted by the lifecycle APIs.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use fmx_common::Money;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{CargoType, LoadStatus, Place, VehicleType},
    traits::LookupError,
};

//--------------------------------------   UpdateLoadRequest   -------------------------------------------------------
/// A partial update to a load. Only fields that are `Some` are written. Applying an empty request is an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLoadRequest {
    pub cargo_type: Option<CargoType>,
    pub weight_kg: Option<f64>,
    pub volume_m3: Option<f64>,
    pub pickup: Option<Place>,
    pub delivery: Option<Place>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub suggested_price: Option<Money>,
    pub required_vehicles: Option<Vec<VehicleType>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UpdateLoadRequest {
    pub fn with_cargo_type(mut self, cargo_type: CargoType) -> Self {
        self.cargo_type = Some(cargo_type);
        self
    }

    pub fn with_weight_kg(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn with_pickup(mut self, place: Place) -> Self {
        self.pickup = Some(place);
        self
    }

    pub fn with_delivery(mut self, place: Place) -> Self {
        self.delivery = Some(place);
        self
    }

    pub fn with_suggested_price(mut self, price: Money) -> Self {
        self.suggested_price = Some(price);
        self
    }

    pub fn with_pickup_date(mut self, date: DateTime<Utc>) -> Self {
        self.pickup_date = Some(date);
        self
    }

    pub fn with_required_vehicles(mut self, vehicles: Vec<VehicleType>) -> Self {
        self.required_vehicles = Some(vehicles);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cargo_type.is_none()
            && self.weight_kg.is_none()
            && self.volume_m3.is_none()
            && self.pickup.is_none()
            && self.delivery.is_none()
            && self.pickup_date.is_none()
            && self.delivery_date.is_none()
            && self.suggested_price.is_none()
            && self.required_vehicles.is_none()
            && self.expires_at.is_none()
    }
}

//--------------------------------------   UpdateBidRequest    -------------------------------------------------------
/// A partial update to a pending bid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBidRequest {
    pub amount: Option<Money>,
    pub message: Option<String>,
    pub vehicle_id: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UpdateBidRequest {
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_vehicle_id(mut self, vehicle_id: i64) -> Self {
        self.vehicle_id = Some(vehicle_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.message.is_none() && self.vehicle_id.is_none() && self.expires_at.is_none()
    }
}

//--------------------------------------  CompleteTripRequest  -------------------------------------------------------
/// The closing details for a trip. `delivery_proof_uri` may be omitted when a proof has already been attached
/// during the trip; completion without any proof at all is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteTripRequest {
    pub delivery_proof_uri: Option<String>,
    pub signature_uri: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl CompleteTripRequest {
    pub fn with_delivery_proof(mut self, uri: impl Into<String>) -> Self {
        self.delivery_proof_uri = Some(uri.into());
        self
    }

    pub fn with_signature(mut self, uri: impl Into<String>) -> Self {
        self.signature_uri = Some(uri.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

//--------------------------------------    LoadQueryFilter    -------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadQueryFilter {
    pub owner_id: Option<i64>,
    pub status: Option<Vec<LoadStatus>>,
    pub cargo_type: Option<CargoType>,
    pub pickup_province: Option<String>,
    pub delivery_province: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl LoadQueryFilter {
    pub fn with_owner_id(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_status(mut self, status: LoadStatus) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_cargo_type(mut self, cargo_type: CargoType) -> Self {
        self.cargo_type = Some(cargo_type);
        self
    }

    pub fn with_pickup_province(mut self, province: impl Into<String>) -> Self {
        self.pickup_province = Some(province.into());
        self
    }

    pub fn with_delivery_province(mut self, province: impl Into<String>) -> Self {
        self.delivery_province = Some(province.into());
        self
    }

    pub fn since<T>(mut self, since: T) -> Result<Self, LookupError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = since.try_into().map_err(|e| LookupError::QueryError(e.to_string()))?;
        self.since = Some(dt);
        Ok(self)
    }

    pub fn until<T>(mut self, until: T) -> Result<Self, LookupError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = until.try_into().map_err(|e| LookupError::QueryError(e.to_string()))?;
        self.until = Some(dt);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.owner_id.is_none()
            && self.status.as_ref().map_or(true, |s| s.is_empty())
            && self.cargo_type.is_none()
            && self.pickup_province.is_none()
            && self.delivery_province.is_none()
            && self.since.is_none()
            && self.until.is_none()
    }
}

impl Display for LoadQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(owner_id) = self.owner_id {
            write!(f, "owner: {owner_id}. ")?;
        }
        if let Some(statuses) = self.status.as_deref().filter(|s| !s.is_empty()) {
            let s = statuses.iter().map(|s| s.to_string()).collect::<Vec<_>>().join("|");
            write!(f, "status: {s}. ")?;
        }
        if let Some(cargo_type) = self.cargo_type {
            write!(f, "cargo: {cargo_type}. ")?;
        }
        if let Some(p) = &self.pickup_province {
            write!(f, "from: {p}. ")?;
        }
        if let Some(p) = &self.delivery_province {
            write!(f, "to: {p}. ")?;
        }
        if let Some(since) = self.since {
            write!(f, "since: {since}. ")?;
        }
        if let Some(until) = self.until {
            write!(f, "until: {until}. ")?;
        }
        Ok(())
    }
}
