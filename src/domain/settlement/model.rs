use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SettlementKind {
    Booking,
    Extension,
}

impl SettlementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "Booking",
            Self::Extension => "Extension",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Booking" => Some(Self::Booking),
            "Extension" => Some(Self::Extension),
            _ => None,
        }
    }
}

/// `Authorized → Captured` on commit, `Authorized → Voided` when the
/// reservation write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SettlementStatus {
    Authorized,
    Captured,
    Voided,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "Authorized",
            Self::Captured => "Captured",
            Self::Voided => "Voided",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Authorized" => Some(Self::Authorized),
            "Captured" => Some(Self::Captured),
            "Voided" => Some(Self::Voided),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub id: Uuid,
    pub idempotency_key: String,
    pub user_id: Uuid,
    /// Set once the reservation is committed
    pub reservation_id: Option<Uuid>,
    pub kind: SettlementKind,
    pub amount: Decimal,
    pub provider_reference: String,
    pub status: SettlementStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Settlement {
    pub fn authorized(
        idempotency_key: impl Into<String>,
        user_id: Uuid,
        reservation_id: Option<Uuid>,
        kind: SettlementKind,
        amount: Decimal,
        provider_reference: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            idempotency_key: idempotency_key.into(),
            user_id,
            reservation_id,
            kind,
            amount,
            provider_reference: provider_reference.into(),
            status: SettlementStatus::Authorized,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn capture(&mut self, reservation_id: Uuid) {
        self.reservation_id = Some(reservation_id);
        self.status = SettlementStatus::Captured;
        self.updated_at = Utc::now();
    }

    pub fn void(&mut self) {
        self.status = SettlementStatus::Voided;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_links_reservation() {
        let mut s = Settlement::authorized(
            "key-1",
            Uuid::new_v4(),
            None,
            SettlementKind::Booking,
            Decimal::from(100),
            "sim_1",
        );
        assert_eq!(s.status, SettlementStatus::Authorized);
        let reservation = Uuid::new_v4();
        s.capture(reservation);
        assert_eq!(s.status, SettlementStatus::Captured);
        assert_eq!(s.reservation_id, Some(reservation));
    }

    #[test]
    fn status_strings_roundtrip() {
        for st in [
            SettlementStatus::Authorized,
            SettlementStatus::Captured,
            SettlementStatus::Voided,
        ] {
            assert_eq!(SettlementStatus::from_str(st.as_str()), Some(st));
        }
        for k in [SettlementKind::Booking, SettlementKind::Extension] {
            assert_eq!(SettlementKind::from_str(k.as_str()), Some(k));
        }
    }
}
