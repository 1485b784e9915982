//! Pricing DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingQuoteRequest {
    pub slot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtensionQuoteRequest {
    pub reservation_id: Uuid,
    pub hours_to_add: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuoteResponse {
    /// Fractional hours; absent for extensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
    /// Exact amount that will be charged
    pub total: Decimal,
    /// Rounded for display, e.g. `৳150.00`
    pub display_total: String,
    pub currency: String,
}
