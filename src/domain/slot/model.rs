//! Slot domain entity

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::types::FieldErrors;

/// Slot occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SlotStatus {
    Available,
    Reserved,
    Occupied,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Reserved => "Reserved",
            Self::Occupied => "Occupied",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Available" => Some(Self::Available),
            "Reserved" => Some(Self::Reserved),
            "Occupied" => Some(Self::Occupied),
            _ => None,
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum VehicleType {
    Car,
    Bike,
    #[serde(rename = "SUV")]
    Suv,
    Minivan,
    Truck,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Bike => "Bike",
            Self::Suv => "SUV",
            Self::Minivan => "Minivan",
            Self::Truck => "Truck",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Car" => Some(Self::Car),
            "Bike" => Some(Self::Bike),
            "SUV" => Some(Self::Suv),
            "Minivan" => Some(Self::Minivan),
            "Truck" => Some(Self::Truck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A parking slot
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: Uuid,
    pub name: String,
    pub location: GeoPoint,
    pub address: String,
    pub status: SlotStatus,
    pub vehicle_type: VehicleType,
    pub price_per_hour: Decimal,
    pub features: BTreeSet<String>,
    pub operating_hours: String,
    pub rating: Option<Decimal>,
    pub review_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin-supplied slot attributes, used for both create and update.
#[derive(Debug, Clone)]
pub struct SlotDraft {
    pub name: String,
    pub location: GeoPoint,
    pub address: String,
    /// Defaults to `Available` on create and to the current status on update.
    pub status: Option<SlotStatus>,
    pub vehicle_type: VehicleType,
    pub price_per_hour: Decimal,
    pub features: BTreeSet<String>,
    pub operating_hours: String,
    pub rating: Option<Decimal>,
    pub review_count: Option<u32>,
}

impl SlotDraft {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        }
        if self.price_per_hour < Decimal::ZERO {
            errors.push("price_per_hour", "must not be negative");
        }
        if let Some(rating) = self.rating {
            if rating < Decimal::ZERO || rating > Decimal::from(5) {
                errors.push("rating", "must be between 0 and 5");
            }
        }
        if !(-90.0..=90.0).contains(&self.location.lat) {
            errors.push("location", "latitude must be between -90 and 90");
        } else if !(-180.0..=180.0).contains(&self.location.lon) {
            errors.push("location", "longitude must be between -180 and 180");
        }
        errors.into_result()
    }
}

impl Slot {
    /// Build a new slot from a validated draft with a fresh id.
    pub fn from_draft(draft: SlotDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            location: draft.location,
            address: draft.address,
            status: draft.status.unwrap_or(SlotStatus::Available),
            vehicle_type: draft.vehicle_type,
            price_per_hour: draft.price_per_hour,
            features: draft.features,
            operating_hours: draft.operating_hours,
            rating: draft.rating,
            review_count: draft.review_count,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite editable attributes, keeping id and creation time.
    pub fn apply(&mut self, draft: SlotDraft, now: DateTime<Utc>) {
        self.name = draft.name.trim().to_string();
        self.location = draft.location;
        self.address = draft.address;
        if let Some(status) = draft.status {
            self.status = status;
        }
        self.vehicle_type = draft.vehicle_type;
        self.price_per_hour = draft.price_per_hour;
        self.features = draft.features;
        self.operating_hours = draft.operating_hours;
        self.rating = draft.rating;
        self.review_count = draft.review_count;
        self.updated_at = now;
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

/// Slot search criteria; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SlotFilter {
    pub vehicle_type: Option<VehicleType>,
    pub max_price: Option<Decimal>,
    pub feature: Option<String>,
    pub available_only: bool,
}

impl SlotFilter {
    pub fn matches(&self, slot: &Slot) -> bool {
        if self.available_only && !slot.is_available() {
            return false;
        }
        if let Some(vt) = self.vehicle_type {
            if slot.vehicle_type != vt {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if slot.price_per_hour > max {
                return false;
            }
        }
        if let Some(feature) = &self.feature {
            if !slot
                .features
                .iter()
                .any(|f| f.eq_ignore_ascii_case(feature))
            {
                return false;
            }
        }
        true
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SlotDraft {
        SlotDraft {
            name: "Gulshan 1 - A".into(),
            location: GeoPoint {
                lat: 23.78,
                lon: 90.41,
            },
            address: "Gulshan Ave, Dhaka".into(),
            status: None,
            vehicle_type: VehicleType::Car,
            price_per_hour: Decimal::from(50),
            features: ["Covered".to_string(), "CCTV".to_string()].into(),
            operating_hours: "24/7".into(),
            rating: Some(Decimal::from(4)),
            review_count: Some(12),
        }
    }

    #[test]
    fn new_slot_defaults_to_available() {
        let slot = Slot::from_draft(draft(), Utc::now());
        assert_eq!(slot.status, SlotStatus::Available);
        assert_eq!(slot.created_at, slot.updated_at);
    }

    #[test]
    fn validation_reports_each_field() {
        let mut d = draft();
        d.name = "  ".into();
        d.price_per_hour = Decimal::from(-1);
        d.rating = Some(Decimal::from(6));
        let errors = d.validate().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("price_per_hour"));
        assert!(errors.has("rating"));
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn apply_keeps_status_when_not_given() {
        let mut slot = Slot::from_draft(draft(), Utc::now());
        slot.status = SlotStatus::Reserved;
        let mut d = draft();
        d.price_per_hour = Decimal::from(70);
        slot.apply(d, Utc::now());
        assert_eq!(slot.status, SlotStatus::Reserved);
        assert_eq!(slot.price_per_hour, Decimal::from(70));
    }

    #[test]
    fn filter_matches_on_all_criteria() {
        let slot = Slot::from_draft(draft(), Utc::now());
        let filter = SlotFilter {
            vehicle_type: Some(VehicleType::Car),
            max_price: Some(Decimal::from(60)),
            feature: Some("cctv".into()),
            available_only: true,
        };
        assert!(filter.matches(&slot));

        let too_cheap = SlotFilter {
            max_price: Some(Decimal::from(40)),
            ..SlotFilter::default()
        };
        assert!(!too_cheap.matches(&slot));

        let bikes = SlotFilter {
            vehicle_type: Some(VehicleType::Bike),
            ..SlotFilter::default()
        };
        assert!(!bikes.matches(&slot));
    }

    #[test]
    fn suv_uses_upper_case_name() {
        assert_eq!(serde_json::to_string(&VehicleType::Suv).unwrap(), "\"SUV\"");
        assert_eq!(VehicleType::from_str("SUV"), Some(VehicleType::Suv));
    }
}
