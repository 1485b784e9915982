//! Slot DTOs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::slot::{GeoPoint, Slot, SlotDraft, SlotFilter, SlotStatus, VehicleType};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    pub id: Uuid,
    pub name: String,
    pub location: GeoPoint,
    pub address: String,
    pub status: SlotStatus,
    pub vehicle_type: VehicleType,
    pub price_per_hour: Decimal,
    pub features: Vec<String>,
    pub operating_hours: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Slot> for SlotDto {
    fn from(s: Slot) -> Self {
        Self {
            id: s.id,
            name: s.name,
            location: s.location,
            address: s.address,
            status: s.status,
            vehicle_type: s.vehicle_type,
            price_per_hour: s.price_per_hour,
            features: s.features.into_iter().collect(),
            operating_hours: s.operating_hours,
            rating: s.rating,
            review_count: s.review_count,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Create or replace a slot's attributes
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SlotRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub location: GeoPoint,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    /// Omit to default to Available (create) or keep the current status (update)
    pub status: Option<SlotStatus>,
    pub vehicle_type: VehicleType,
    pub price_per_hour: Decimal,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default = "default_operating_hours")]
    #[validate(length(max = 100))]
    pub operating_hours: String,
    pub rating: Option<Decimal>,
    pub review_count: Option<u32>,
}

fn default_operating_hours() -> String {
    "24/7".to_string()
}

impl From<SlotRequest> for SlotDraft {
    fn from(r: SlotRequest) -> Self {
        Self {
            name: r.name,
            location: r.location,
            address: r.address,
            status: r.status,
            vehicle_type: r.vehicle_type,
            price_per_hour: r.price_per_hour,
            features: r.features,
            operating_hours: r.operating_hours,
            rating: r.rating,
            review_count: r.review_count,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub status: SlotStatus,
}

/// Search filters; all optional
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SlotSearchParams {
    /// Car, Bike or SUV
    pub vehicle_type: Option<VehicleType>,
    /// Highest acceptable price per hour
    pub max_price: Option<Decimal>,
    /// Feature name, case-insensitive
    pub feature: Option<String>,
    /// Only slots that can be booked right now
    #[serde(default)]
    pub available_only: bool,
}

impl From<SlotSearchParams> for SlotFilter {
    fn from(p: SlotSearchParams) -> Self {
        Self {
            vehicle_type: p.vehicle_type,
            max_price: p.max_price,
            feature: p.feature.filter(|f| !f.trim().is_empty()),
            available_only: p.available_only,
        }
    }
}
