//! Reservation domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::pricing;
use crate::domain::{DomainError, DomainResult};

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ReservationStatus {
    /// Booked and not yet ended
    Active,
    /// Ended by the user, an admin or the overdue sweeper
    Completed,
    /// Reserved for admin override; no flow produces it yet
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(Self::Active),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time-bounded booking of a slot
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Sum of the booking cost and every extension, never rounded
    pub total_cost: Decimal,
    pub status: ReservationStatus,
    /// Display label of the instrument used at checkout
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by every change. A store write only lands on the version the
    /// change was made from.
    pub version: i64,
}

impl Reservation {
    /// Price a new Active reservation at `price_per_hour`.
    pub fn new(
        user_id: Uuid,
        slot_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        price_per_hour: Decimal,
        payment_method: Option<String>,
    ) -> DomainResult<Self> {
        let total_cost = pricing::cost(price_per_hour, start_time, end_time)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            slot_id,
            start_time,
            end_time,
            total_cost,
            status: ReservationStatus::Active,
            payment_method,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// Active and not yet past its end time.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.end_time > now
    }

    /// Push the end time forward and add the extension cost at the slot's
    /// current rate. Returns the added cost.
    pub fn extend(
        &mut self,
        hours_to_add: Decimal,
        price_per_hour: Decimal,
        payment_method: Option<String>,
    ) -> DomainResult<Decimal> {
        let added = pricing::extension_cost(price_per_hour, hours_to_add)?;
        let end_time = self
            .end_time
            .checked_add_signed(pricing::hours_to_duration(hours_to_add)?)
            .ok_or_else(|| {
                DomainError::InvalidDuration(format!(
                    "extending by {hours_to_add}h runs past the supported calendar"
                ))
            })?;
        let total_cost = self
            .total_cost
            .checked_add(added)
            .ok_or_else(|| DomainError::InvalidDuration("extension cost is too large".into()))?;

        self.end_time = end_time;
        self.total_cost = total_cost;
        if payment_method.is_some() {
            self.payment_method = payment_method;
        }
        self.touch(Utc::now());
        Ok(added)
    }

    /// End now. The paid window is truncated without refund; a reservation
    /// that has not started yet ends at its start time.
    pub fn end_at(&mut self, now: DateTime<Utc>) {
        self.status = ReservationStatus::Completed;
        self.end_time = now.max(self.start_time);
        self.touch(now);
    }

    /// Complete an overdue reservation, keeping its scheduled end time.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.status = ReservationStatus::Completed;
        self.touch(now);
    }

    /// Version the stored row must still carry for this change to apply.
    pub fn base_version(&self) -> i64 {
        self.version - 1
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

// ── Tests ──────────────────────────────────────────────────────
