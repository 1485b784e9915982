//! Reservation DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::reservation::{Reservation, ReservationStatus};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReservationDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Exact, unrounded
    pub total_cost: Decimal,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            slot_id: r.slot_id,
            start_time: r.start_time,
            end_time: r.end_time,
            total_cost: r.total_cost,
            status: r.status,
            payment_method: r.payment_method,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub(crate) fn to_dtos(reservations: Vec<Reservation>) -> Vec<ReservationDto> {
    reservations.into_iter().map(ReservationDto::from).collect()
}
