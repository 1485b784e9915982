//! Simulated payment gateway
//!
//! Approves every charge without contacting a provider. Authorizations are
//! tracked in memory so capture and void still check their reference, and
//! re-authorizing with the same idempotency key returns the same reference.

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::info;

use crate::application::ports::{ChargeRequest, PaymentError, PaymentGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedChargeState {
    Authorized,
    Captured,
    Voided,
}

#[derive(Debug, Clone)]
struct SimulatedCharge {
    amount: Decimal,
    state: SimulatedChargeState,
}

#[derive(Default)]
pub struct SimulatedGateway {
    by_key: DashMap<String, String>,
    charges: DashMap<String, SimulatedCharge>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, reference: &str) -> Option<SimulatedChargeState> {
        self.charges.get(reference).map(|c| c.state)
    }

    /// Number of charges that were captured
    pub fn captured_count(&self) -> usize {
        self.charges
            .iter()
            .filter(|c| c.state == SimulatedChargeState::Captured)
            .count()
    }

    pub fn voided_count(&self) -> usize {
        self.charges
            .iter()
            .filter(|c| c.state == SimulatedChargeState::Voided)
            .count()
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn authorize(&self, request: &ChargeRequest) -> Result<String, PaymentError> {
        let reference = self
            .by_key
            .entry(request.idempotency_key.clone())
            .or_insert_with(|| format!("sim_{}", uuid::Uuid::new_v4().simple()))
            .clone();

        self.charges
            .entry(reference.clone())
            .or_insert_with(|| SimulatedCharge {
                amount: request.amount,
                state: SimulatedChargeState::Authorized,
            });

        info!(
            reference = %reference,
            user_id = %request.user_id,
            amount = %request.amount,
            currency = %request.currency,
            instrument = %request.instrument_label,
            "Simulated authorization approved"
        );
        Ok(reference)
    }

    async fn capture(&self, reference: &str, amount: Decimal) -> Result<(), PaymentError> {
        let mut charge = self
            .charges
            .get_mut(reference)
            .ok_or_else(|| PaymentError::UnknownReference(reference.to_string()))?;
        match charge.state {
            SimulatedChargeState::Voided => Err(PaymentError::Declined(format!(
                "authorization {} was voided",
                reference
            ))),
            _ => {
                charge.amount = amount;
                charge.state = SimulatedChargeState::Captured;
                Ok(())
            }
        }
    }

    async fn void(&self, reference: &str) -> Result<(), PaymentError> {
        let mut charge = self
            .charges
            .get_mut(reference)
            .ok_or_else(|| PaymentError::UnknownReference(reference.to_string()))?;
        match charge.state {
            SimulatedChargeState::Captured => Err(PaymentError::Provider(format!(
                "charge {} is already captured",
                reference
            ))),
            _ => {
                charge.state = SimulatedChargeState::Voided;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request(key: &str) -> ChargeRequest {
        ChargeRequest {
            idempotency_key: key.into(),
            user_id: Uuid::new_v4(),
            amount: Decimal::from(100),
            currency: "BDT".into(),
            instrument_label: "Card •••• 4242".into(),
        }
    }

    #[tokio::test]
    async fn same_key_reuses_reference() {
        let gw = SimulatedGateway::new();
        let a = gw.authorize(&request("k1")).await.unwrap();
        let b = gw.authorize(&request("k1")).await.unwrap();
        let c = gw.authorize(&request("k2")).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("sim_"));
    }

    #[tokio::test]
    async fn capture_and_void_are_exclusive() {
        let gw = SimulatedGateway::new();
        let captured = gw.authorize(&request("k1")).await.unwrap();
        gw.capture(&captured, Decimal::from(100)).await.unwrap();
        assert!(gw.void(&captured).await.is_err());

        let voided = gw.authorize(&request("k2")).await.unwrap();
        gw.void(&voided).await.unwrap();
        assert!(gw.capture(&voided, Decimal::from(100)).await.is_err());

        assert_eq!(gw.captured_count(), 1);
        assert_eq!(gw.voided_count(), 1);
        assert!(gw.capture("sim_missing", Decimal::ONE).await.is_err());
    }
}
