//! Checkout DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::services::{
    BookingRequest, CheckoutReceipt, ExtensionRequest, PaymentSelection,
};
use crate::domain::payment_method::PaymentInput;
use crate::interfaces::http::modules::reservations::ReservationDto;

/// Which instrument pays for the checkout
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PaymentSelectionRequest {
    Saved {
        method_id: Uuid,
    },
    New {
        details: PaymentInput,
        #[serde(default)]
        save_for_future: bool,
    },
}

impl From<PaymentSelectionRequest> for PaymentSelection {
    fn from(req: PaymentSelectionRequest) -> Self {
        match req {
            PaymentSelectionRequest::Saved { method_id } => Self::Saved { method_id },
            PaymentSelectionRequest::New {
                details,
                save_for_future,
            } => Self::New {
                input: details,
                save_for_future,
            },
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingCheckoutRequest {
    pub slot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub payment: PaymentSelectionRequest,
}

impl BookingCheckoutRequest {
    pub fn into_request(self, idempotency_key: Option<String>) -> BookingRequest {
        BookingRequest {
            slot_id: self.slot_id,
            start_time: self.start_time,
            end_time: self.end_time,
            payment: self.payment.into(),
            idempotency_key,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtensionCheckoutRequest {
    pub reservation_id: Uuid,
    /// Fractional hours are allowed, up to 744 (31 days)
    pub hours_to_add: Decimal,
    pub payment: PaymentSelectionRequest,
}

impl ExtensionCheckoutRequest {
    pub fn into_request(self, idempotency_key: Option<String>) -> ExtensionRequest {
        ExtensionRequest {
            reservation_id: self.reservation_id,
            hours_to_add: self.hours_to_add,
            payment: self.payment.into(),
            idempotency_key,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutReceiptDto {
    pub reservation: ReservationDto,
    pub settlement_id: Uuid,
    pub amount_charged: Decimal,
    pub payment_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_method_id: Option<Uuid>,
    pub replayed: bool,
}

impl From<CheckoutReceipt> for CheckoutReceiptDto {
    fn from(r: CheckoutReceipt) -> Self {
        Self {
            reservation: r.reservation.into(),
            settlement_id: r.settlement_id,
            amount_charged: r.amount_charged,
            payment_label: r.payment_label,
            saved_method_id: r.saved_method_id,
            replayed: r.replayed,
        }
    }
}
