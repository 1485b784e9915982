//! Payment method DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::payment_method::{PaymentInstrument, SavedPaymentMethod};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentMethodDto {
    pub id: Uuid,
    pub instrument: PaymentInstrument,
    /// e.g. `Card •••• 4242`
    pub label: String,
    pub created_at: DateTime<Utc>,
}

impl From<SavedPaymentMethod> for PaymentMethodDto {
    fn from(m: SavedPaymentMethod) -> Self {
        Self {
            id: m.id,
            label: m.instrument.label(),
            instrument: m.instrument,
            created_at: m.created_at,
        }
    }
}
