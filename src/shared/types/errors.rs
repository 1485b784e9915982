use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected, otherwise the errors themselves.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("User is not authenticated")]
    UserNotAuthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Reservation {0} not found")]
    ReservationNotFound(Uuid),

    #[error("Slot {0} not found")]
    SlotNotFound(Uuid),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Payment method {0} not found")]
    PaymentMethodNotFound(Uuid),

    #[error("This payment method is already in use")]
    DuplicateMethod,

    #[error("Validation: {0}")]
    Validation(FieldErrors),

    #[error("Slot {0} is not available")]
    SlotUnavailable(Uuid),

    #[error("Slot {0} has an active reservation")]
    SlotInUse(Uuid),

    #[error("Reservation {0} is not active")]
    ReservationNotActive(Uuid),

    #[error("Reservation {0} was changed by another request")]
    ReservationChanged(Uuid),

    #[error("Idempotency key {0} was used for a different checkout")]
    IdempotencyKeyReused(String),

    #[error("Settlement failed: {0}")]
    Settlement(String),

    #[error("Backing store timed out during {0}")]
    StoreTimeout(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Whether this error is likely transient (store hiccup, slow query)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::StoreTimeout(_) | DomainError::Storage(_))
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_display_joins_fields() {
        let mut errors = FieldErrors::new();
        errors.push("card_number", "must be 16 digits");
        errors.push("cvc", "must be 3-4 digits");
        assert_eq!(
            errors.to_string(),
            "card_number: must be 16 digits; cvc: must be 3-4 digits"
        );
        assert!(errors.has("cvc"));
        assert!(!errors.has("expiry_date"));
    }

    #[test]
    fn empty_field_errors_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn only_store_errors_are_transient() {
        assert!(DomainError::StoreTimeout("list_users").is_transient());
        assert!(DomainError::Storage("locked".into()).is_transient());
        assert!(!DomainError::DuplicateMethod.is_transient());
        assert!(!DomainError::SlotNotFound(Uuid::new_v4()).is_transient());
    }
}
