//! Payment gateway abstraction
//!
//! Settlement is a two-phase charge: `authorize` reserves the amount and
//! returns a provider reference, then exactly one of `capture` or `void`
//! finalizes it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::shared::types::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Unknown payment reference {0}")]
    UnknownReference(String),
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::Settlement(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub idempotency_key: String,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    /// Display label of the instrument being charged
    pub instrument_label: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Reserve funds. Returns the provider's reference for the charge.
    async fn authorize(&self, request: &ChargeRequest) -> Result<String, PaymentError>;

    /// Finalize a prior authorization for `amount`.
    async fn capture(&self, reference: &str, amount: Decimal) -> Result<(), PaymentError>;

    /// Release a prior authorization without charging.
    async fn void(&self, reference: &str) -> Result<(), PaymentError>;
}
