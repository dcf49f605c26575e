//! Data records and status types for the marketplace engine.
//!
//! Everything in this module maps 1:1 onto a database row (or a to-be-inserted row). The status enums implement the
//! legal transitions of the Load, Bid and Trip state machines; the transition *logic* lives in the storage backend,
//! which re-checks statuses at write time.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fmx_common::Money;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------      LoadStatus      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum LoadStatus {
    /// The load has been created but is not visible to drivers yet.
    Draft,
    /// The load is published and accepting bids.
    Open,
    /// The owner has stopped new bids, but may still accept an existing one.
    BiddingClosed,
    /// A bid has been accepted and a trip exists for this load.
    Assigned,
    /// The assigned trip is underway.
    InTransit,
    /// The assigned trip completed. Terminal.
    Delivered,
    /// The owner cancelled the load before it was assigned. Terminal.
    Cancelled,
}

impl LoadStatus {
    /// States in which the owner may still edit the load.
    pub fn is_editable(&self) -> bool {
        matches!(self, LoadStatus::Draft | LoadStatus::Open | LoadStatus::BiddingClosed)
    }

    /// States in which a bid may be accepted against the load.
    pub fn accepts_bid(&self) -> bool {
        matches!(self, LoadStatus::Open | LoadStatus::BiddingClosed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStatus::Delivered | LoadStatus::Cancelled)
    }
}

impl Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Draft => write!(f, "Draft"),
            LoadStatus::Open => write!(f, "Open"),
            LoadStatus::BiddingClosed => write!(f, "BiddingClosed"),
            LoadStatus::Assigned => write!(f, "Assigned"),
            LoadStatus::InTransit => write!(f, "InTransit"),
            LoadStatus::Delivered => write!(f, "Delivered"),
            LoadStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for LoadStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Open" => Ok(Self::Open),
            "BiddingClosed" => Ok(Self::BiddingClosed),
            "Assigned" => Ok(Self::Assigned),
            "InTransit" => Ok(Self::InTransit),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid load status: {s}"))),
        }
    }
}

//--------------------------------------      BidStatus       --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum BidStatus {
    /// The bid is live and awaiting a decision from the load owner.
    Pending,
    /// The load owner accepted this bid. A trip exists for it.
    Accepted,
    /// The load owner turned the bid down. Terminal.
    Rejected,
    /// The driver withdrew the bid. Terminal.
    Withdrawn,
}

impl Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BidStatus::Pending => write!(f, "Pending"),
            BidStatus::Accepted => write!(f, "Accepted"),
            BidStatus::Rejected => write!(f, "Rejected"),
            BidStatus::Withdrawn => write!(f, "Withdrawn"),
        }
    }
}

impl FromStr for BidStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            "Withdrawn" => Ok(Self::Withdrawn),
            s => Err(ConversionError(format!("Invalid bid status: {s}"))),
        }
    }
}

//--------------------------------------      TripStatus      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TripStatus {
    /// Created at bid acceptance. The driver has not started driving yet.
    Scheduled,
    /// The driver has started the trip.
    InProgress,
    /// Delivered, with proof. Terminal.
    Completed,
    /// Cancelled by either party. The load and bid are rolled back. Terminal.
    Cancelled,
}

impl Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripStatus::Scheduled => write!(f, "Scheduled"),
            TripStatus::InProgress => write!(f, "InProgress"),
            TripStatus::Completed => write!(f, "Completed"),
            TripStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for TripStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(Self::Scheduled),
            "InProgress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid trip status: {s}"))),
        }
    }
}

/// The load status that mirrors a given trip status. The pair must always agree once a trip exists.
pub fn load_status_for_trip(status: TripStatus) -> Option<LoadStatus> {
    match status {
        TripStatus::Scheduled => Some(LoadStatus::Assigned),
        TripStatus::InProgress => Some(LoadStatus::InTransit),
        TripStatus::Completed => Some(LoadStatus::Delivered),
        // A cancelled trip reopens the load rather than mirroring it
        TripStatus::Cancelled => None,
    }
}

//--------------------------------------   SubscriptionTier   --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum SubscriptionTier {
    Free,
    Pro,
    Fleet,
}

impl SubscriptionTier {
    /// Loads that may be published per calendar month. `None` means unlimited.
    pub fn monthly_load_limit(&self) -> Option<i64> {
        match self {
            SubscriptionTier::Free => Some(1),
            SubscriptionTier::Pro | SubscriptionTier::Fleet => None,
        }
    }

    /// Bids that may be placed per calendar month. `None` means unlimited.
    pub fn monthly_bid_limit(&self) -> Option<i64> {
        match self {
            SubscriptionTier::Free => Some(3),
            SubscriptionTier::Pro | SubscriptionTier::Fleet => None,
        }
    }

    pub fn limit_for(&self, kind: QuotaKind) -> Option<i64> {
        match kind {
            QuotaKind::Load => self.monthly_load_limit(),
            QuotaKind::Bid => self.monthly_bid_limit(),
        }
    }

    /// The tier a user should be nudged towards when they hit this tier's limit.
    pub fn upgrade_hint(&self) -> Option<SubscriptionTier> {
        match self {
            SubscriptionTier::Free => Some(SubscriptionTier::Pro),
            SubscriptionTier::Pro => Some(SubscriptionTier::Fleet),
            SubscriptionTier::Fleet => None,
        }
    }
}

impl Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "Free"),
            SubscriptionTier::Pro => write!(f, "Pro"),
            SubscriptionTier::Fleet => write!(f, "Fleet"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Free" => Ok(Self::Free),
            "Pro" => Ok(Self::Pro),
            "Fleet" => Ok(Self::Fleet),
            s => Err(ConversionError(format!("Invalid subscription tier: {s}"))),
        }
    }
}

//--------------------------------------       QuotaKind      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaKind {
    Load,
    Bid,
}

impl Display for QuotaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaKind::Load => write!(f, "load"),
            QuotaKind::Bid => write!(f, "bid"),
        }
    }
}

//--------------------------------------      CargoType       --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum CargoType {
    GeneralFreight,
    Refrigerated,
    Livestock,
    Vehicles,
    Hazardous,
    Construction,
    Furniture,
    Other,
}

impl Display for CargoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CargoType::GeneralFreight => "GeneralFreight",
            CargoType::Refrigerated => "Refrigerated",
            CargoType::Livestock => "Livestock",
            CargoType::Vehicles => "Vehicles",
            CargoType::Hazardous => "Hazardous",
            CargoType::Construction => "Construction",
            CargoType::Furniture => "Furniture",
            CargoType::Other => "Other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CargoType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GeneralFreight" => Ok(Self::GeneralFreight),
            "Refrigerated" => Ok(Self::Refrigerated),
            "Livestock" => Ok(Self::Livestock),
            "Vehicles" => Ok(Self::Vehicles),
            "Hazardous" => Ok(Self::Hazardous),
            "Construction" => Ok(Self::Construction),
            "Furniture" => Ok(Self::Furniture),
            "Other" => Ok(Self::Other),
            s => Err(ConversionError(format!("Invalid cargo type: {s}"))),
        }
    }
}

//--------------------------------------     VehicleType      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum VehicleType {
    Bakkie,
    Van,
    FlatBed,
    BoxBody,
    Refrigerated,
    Tautliner,
    Tipper,
    Lowbed,
    Tanker,
}

impl Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VehicleType::Bakkie => "Bakkie",
            VehicleType::Van => "Van",
            VehicleType::FlatBed => "FlatBed",
            VehicleType::BoxBody => "BoxBody",
            VehicleType::Refrigerated => "Refrigerated",
            VehicleType::Tautliner => "Tautliner",
            VehicleType::Tipper => "Tipper",
            VehicleType::Lowbed => "Lowbed",
            VehicleType::Tanker => "Tanker",
        };
        write!(f, "{s}")
    }
}

impl FromStr for VehicleType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bakkie" => Ok(Self::Bakkie),
            "Van" => Ok(Self::Van),
            "FlatBed" => Ok(Self::FlatBed),
            "BoxBody" => Ok(Self::BoxBody),
            "Refrigerated" => Ok(Self::Refrigerated),
            "Tautliner" => Ok(Self::Tautliner),
            "Tipper" => Ok(Self::Tipper),
            "Lowbed" => Ok(Self::Lowbed),
            "Tanker" => Ok(Self::Tanker),
            s => Err(ConversionError(format!("Invalid vehicle type: {s}"))),
        }
    }
}

/// Serialise a set of vehicle types into the comma-separated form used by the `required_vehicles` column.
pub fn vehicle_set_to_string(vehicles: &[VehicleType]) -> String {
    vehicles.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

/// Parse the comma-separated `required_vehicles` column. Unknown entries are dropped with an error log rather than
/// failing the whole row.
pub fn vehicle_set_from_str(s: &str) -> Vec<VehicleType> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .filter_map(|v| match v.parse() {
            Ok(v) => Some(v),
            Err(e) => {
                error!("Dropping unparseable vehicle type from stored set: {e}");
                None
            },
        })
        .collect()
}

//--------------------------------------        Place         --------------------------------------------------------
/// A pickup or delivery point: human-readable address plus coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub address: String,
    pub city: String,
    pub province: String,
    pub lat: f64,
    pub lng: f64,
}

//--------------------------------------       GeoPoint       --------------------------------------------------------
/// A bare coordinate sample, as reported by a driver's device during a trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

//--------------------------------------         Load         --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Load {
    pub id: i64,
    pub owner_id: i64,
    pub cargo_type: CargoType,
    pub weight_kg: f64,
    pub volume_m3: Option<f64>,
    pub pickup_address: String,
    pub pickup_city: String,
    pub pickup_province: String,
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_province: String,
    pub delivery_lat: f64,
    pub delivery_lng: f64,
    pub pickup_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub suggested_price: Money,
    pub currency: String,
    pub required_vehicles: String,
    pub status: LoadStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Load {
    pub fn pickup(&self) -> Place {
        Place {
            address: self.pickup_address.clone(),
            city: self.pickup_city.clone(),
            province: self.pickup_province.clone(),
            lat: self.pickup_lat,
            lng: self.pickup_lng,
        }
    }

    pub fn delivery(&self) -> Place {
        Place {
            address: self.delivery_address.clone(),
            city: self.delivery_city.clone(),
            province: self.delivery_province.clone(),
            lat: self.delivery_lat,
            lng: self.delivery_lng,
        }
    }

    pub fn required_vehicle_types(&self) -> Vec<VehicleType> {
        vehicle_set_from_str(&self.required_vehicles)
    }
}

//--------------------------------------       NewLoad        --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoad {
    pub owner_id: i64,
    pub cargo_type: CargoType,
    pub weight_kg: f64,
    pub volume_m3: Option<f64>,
    pub pickup: Place,
    pub delivery: Place,
    pub pickup_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub suggested_price: Money,
    pub currency: String,
    pub required_vehicles: Vec<VehicleType>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewLoad {
    pub fn new(owner_id: i64, cargo_type: CargoType, weight_kg: f64, pickup: Place, delivery: Place) -> Self {
        Self {
            owner_id,
            cargo_type,
            weight_kg,
            volume_m3: None,
            pickup,
            delivery,
            pickup_date: Utc::now(),
            delivery_date: Utc::now(),
            suggested_price: Money::default(),
            currency: fmx_common::DEFAULT_CURRENCY_CODE.to_string(),
            required_vehicles: Vec::new(),
            expires_at: None,
        }
    }

    pub fn with_dates(mut self, pickup: DateTime<Utc>, delivery: DateTime<Utc>) -> Self {
        self.pickup_date = pickup;
        self.delivery_date = delivery;
        self
    }

    pub fn with_suggested_price(mut self, price: Money) -> Self {
        self.suggested_price = price;
        self
    }

    pub fn with_vehicles(mut self, vehicles: Vec<VehicleType>) -> Self {
        self.required_vehicles = vehicles;
        self
    }
}

//--------------------------------------         Bid          --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Bid {
    pub id: i64,
    pub load_id: i64,
    pub driver_id: i64,
    pub vehicle_id: Option<i64>,
    pub amount: Money,
    pub currency: String,
    pub message: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: BidStatus,
    pub status_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        NewBid        --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBid {
    pub load_id: i64,
    pub driver_id: i64,
    pub vehicle_id: Option<i64>,
    pub amount: Money,
    pub currency: String,
    pub message: Option<String>,
    /// Advisory only. No background sweep enforces bid expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewBid {
    pub fn new(load_id: i64, driver_id: i64, amount: Money) -> Self {
        Self {
            load_id,
            driver_id,
            vehicle_id: None,
            amount,
            currency: fmx_common::DEFAULT_CURRENCY_CODE.to_string(),
            message: None,
            expires_at: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_vehicle(mut self, vehicle_id: i64) -> Self {
        self.vehicle_id = Some(vehicle_id);
        self
    }
}

//--------------------------------------         Trip         --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub load_id: i64,
    pub bid_id: i64,
    pub driver_id: i64,
    pub status: TripStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub current_lat: Option<f64>,
    pub current_lng: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
    /// Snapshot of the accepted bid's amount at acceptance time. Never changes afterwards.
    pub agreed_price: Money,
    pub payment_method: Option<String>,
    pub pickup_proof_uri: Option<String>,
    pub delivery_proof_uri: Option<String>,
    pub signature_uri: Option<String>,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn current_location(&self) -> Option<GeoPoint> {
        match (self.current_lat, self.current_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }
}

//--------------------------------------      RoutePoint      --------------------------------------------------------
/// One sample in a trip's append-only route log.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RoutePoint {
    pub id: i64,
    pub trip_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub recorded_at: DateTime<Utc>,
}

//--------------------------------------     Subscription     --------------------------------------------------------
/// A user's subscription record, with the embedded per-period quota counters.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: i64,
    pub tier: SubscriptionTier,
    pub loads_posted: i64,
    pub bids_placed: i64,
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn counters(&self) -> QuotaCounters {
        QuotaCounters { loads_posted: self.loads_posted, bids_placed: self.bids_placed, last_reset: self.last_reset }
    }

    pub fn used_for(&self, kind: QuotaKind) -> i64 {
        match kind {
            QuotaKind::Load => self.loads_posted,
            QuotaKind::Bid => self.bids_placed,
        }
    }
}

/// The pure counter state that [`crate::helpers::roll_if_new_period`] operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCounters {
    pub loads_posted: i64,
    pub bids_placed: i64,
    pub last_reset: DateTime<Utc>,
}

//--------------------------------------     SavedSearch      --------------------------------------------------------
/// A driver's standing search. When a freshly published load matches, the driver is notified.
/// A criterion that is `None` matches everything.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: i64,
    pub driver_id: i64,
    pub pickup_province: Option<String>,
    pub delivery_province: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub min_weight_kg: Option<f64>,
    pub max_weight_kg: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl SavedSearch {
    /// The in-process part of the matching predicate. Province and weight filtering happen in SQL; the vehicle-set
    /// intersection is done here after parsing the stored set.
    pub fn matches_vehicles(&self, load: &Load) -> bool {
        match self.vehicle_type {
            None => true,
            Some(v) => {
                let required = load.required_vehicle_types();
                // A load with no vehicle requirement is open to everyone
                required.is_empty() || required.contains(&v)
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSavedSearch {
    pub driver_id: i64,
    pub pickup_province: Option<String>,
    pub delivery_province: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub min_weight_kg: Option<f64>,
    pub max_weight_kg: Option<f64>,
}

impl NewSavedSearch {
    pub fn for_driver(driver_id: i64) -> Self {
        Self { driver_id, ..Self::default() }
    }

    pub fn with_pickup_province(mut self, province: impl Into<String>) -> Self {
        self.pickup_province = Some(province.into());
        self
    }

    pub fn with_delivery_province(mut self, province: impl Into<String>) -> Self {
        self.delivery_province = Some(province.into());
        self
    }

    pub fn with_vehicle_type(mut self, vehicle: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle);
        self
    }

    pub fn with_weight_range(mut self, min_kg: Option<f64>, max_kg: Option<f64>) -> Self {
        self.min_weight_kg = min_kg;
        self.max_weight_kg = max_kg;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in ["Draft", "Open", "BiddingClosed", "Assigned", "InTransit", "Delivered", "Cancelled"] {
            let status: LoadStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("open".parse::<LoadStatus>().is_err());
        for s in ["Pending", "Accepted", "Rejected", "Withdrawn"] {
            let status: BidStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        for s in ["Scheduled", "InProgress", "Completed", "Cancelled"] {
            let status: TripStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
    }

    #[test]
    fn trip_status_mirrors_load_status() {
        assert_eq!(load_status_for_trip(TripStatus::Scheduled), Some(LoadStatus::Assigned));
        assert_eq!(load_status_for_trip(TripStatus::InProgress), Some(LoadStatus::InTransit));
        assert_eq!(load_status_for_trip(TripStatus::Completed), Some(LoadStatus::Delivered));
        assert_eq!(load_status_for_trip(TripStatus::Cancelled), None);
    }

    #[test]
    fn vehicle_sets_round_trip() {
        let set = vec![VehicleType::FlatBed, VehicleType::Tautliner];
        let s = vehicle_set_to_string(&set);
        assert_eq!(s, "FlatBed,Tautliner");
        assert_eq!(vehicle_set_from_str(&s), set);
        // junk entries are dropped, not fatal
        assert_eq!(vehicle_set_from_str("FlatBed,horsecart, Tanker"), vec![VehicleType::FlatBed, VehicleType::Tanker]);
        assert!(vehicle_set_from_str("").is_empty());
    }

    #[test]
    fn free_tier_limits() {
        assert_eq!(SubscriptionTier::Free.monthly_load_limit(), Some(1));
        assert_eq!(SubscriptionTier::Free.monthly_bid_limit(), Some(3));
        assert_eq!(SubscriptionTier::Pro.monthly_load_limit(), None);
        assert_eq!(SubscriptionTier::Fleet.monthly_bid_limit(), None);
        assert_eq!(SubscriptionTier::Free.upgrade_hint(), Some(SubscriptionTier::Pro));
    }
}
