//! Checkout flow
//!
//! Resolves the payment instrument, settles the charge through the gateway
//! and commits the booking or extension. A settlement whose commit fails
//! is voided, and every settlement is keyed by an idempotency key so a
//! retried request replays the original outcome instead of charging twice.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{CurrencyService, PaymentVault, ReservationManager};
use crate::application::ports::{ChargeRequest, PaymentGateway};
use crate::domain::payment_method::{PaymentInput, PaymentInstrument};
use crate::domain::reservation::Reservation;
use crate::domain::settlement::{Settlement, SettlementKind, SettlementStatus};
use crate::domain::user::{require_user, CurrentUser};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::utils::{with_deadline, StorePolicy};

/// How the caller pays
#[derive(Debug, Clone)]
pub enum PaymentSelection {
    /// A method from the caller's vault
    Saved { method_id: Uuid },
    /// New details entered at checkout
    New {
        input: PaymentInput,
        save_for_future: bool,
    },
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub slot_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub payment: PaymentSelection,
    /// Generated when absent, which disables replay
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExtensionRequest {
    pub reservation_id: Uuid,
    pub hours_to_add: Decimal,
    pub payment: PaymentSelection,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub reservation: Reservation,
    pub settlement_id: Uuid,
    pub amount_charged: Decimal,
    pub payment_label: String,
    /// Set when the method was saved to the vault during this checkout
    pub saved_method_id: Option<Uuid>,
    /// True when this is a replay of an earlier request with the same key
    pub replayed: bool,
}

/// What a checkout request asks for, checked against a replayed key.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Booking { slot_id: Uuid },
    Extension { reservation_id: Uuid },
}

impl Operation {
    fn kind(&self) -> SettlementKind {
        match self {
            Self::Booking { .. } => SettlementKind::Booking,
            Self::Extension { .. } => SettlementKind::Extension,
        }
    }

    /// Whether an earlier settlement (and its reservation, once linked)
    /// was made for this same operation.
    fn matches(&self, settlement: &Settlement, reservation: Option<&Reservation>) -> bool {
        if settlement.kind != self.kind() {
            return false;
        }
        match self {
            Self::Booking { slot_id } => reservation.map_or(true, |r| r.slot_id == *slot_id),
            Self::Extension { reservation_id } => {
                settlement.reservation_id == Some(*reservation_id)
            }
        }
    }
}

enum ValidatedPayment {
    Saved(Uuid),
    New {
        instrument: PaymentInstrument,
        save_for_future: bool,
    },
}

struct ResolvedPayment {
    label: String,
    saved_method_id: Option<Uuid>,
}

pub struct CheckoutService {
    repos: Arc<dyn RepositoryProvider>,
    reservations: Arc<ReservationManager>,
    vault: Arc<PaymentVault>,
    currency: Arc<CurrencyService>,
    gateway: Arc<dyn PaymentGateway>,
    policy: StorePolicy,
}

impl CheckoutService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        reservations: Arc<ReservationManager>,
        vault: Arc<PaymentVault>,
        currency: Arc<CurrencyService>,
        gateway: Arc<dyn PaymentGateway>,
        policy: StorePolicy,
    ) -> Self {
        Self {
            repos,
            reservations,
            vault,
            currency,
            gateway,
            policy,
        }
    }

    pub async fn book(
        &self,
        actor: Option<&CurrentUser>,
        request: BookingRequest,
    ) -> DomainResult<CheckoutReceipt> {
        let user = require_user(actor)?;
        let operation = Operation::Booking {
            slot_id: request.slot_id,
        };
        if let Some(receipt) = self
            .replay(user, request.idempotency_key.as_deref(), operation)
            .await?
        {
            return Ok(receipt);
        }

        let instrument = self.validate_payment(&request.payment)?;
        let (slot, quote) = self
            .reservations
            .quote_booking(request.slot_id, request.start_time, request.end_time)
            .await?;
        if !slot.is_available() {
            return Err(DomainError::SlotUnavailable(slot.id));
        }
        let payment = self.resolve_payment(user, instrument).await?;

        let key = request
            .idempotency_key
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut settlement = self
            .authorize(user, &key, SettlementKind::Booking, None, quote.total, &payment.label)
            .await?;

        let committed = self
            .reservations
            .create(
                Some(user),
                request.slot_id,
                request.start_time,
                request.end_time,
                Some(payment.label.clone()),
            )
            .await;

        let reservation = match committed {
            Ok(r) => r,
            Err(e) => {
                self.compensate(&mut settlement, &e).await;
                return Err(e);
            }
        };

        self.capture(&mut settlement, &reservation, reservation.total_cost)
            .await?;
        Ok(CheckoutReceipt {
            amount_charged: settlement.amount,
            settlement_id: settlement.id,
            reservation,
            payment_label: payment.label,
            saved_method_id: payment.saved_method_id,
            replayed: false,
        })
    }

    pub async fn extend(
        &self,
        actor: Option<&CurrentUser>,
        request: ExtensionRequest,
    ) -> DomainResult<CheckoutReceipt> {
        let user = require_user(actor)?;
        let operation = Operation::Extension {
            reservation_id: request.reservation_id,
        };
        if let Some(receipt) = self
            .replay(user, request.idempotency_key.as_deref(), operation)
            .await?
        {
            return Ok(receipt);
        }

        let instrument = self.validate_payment(&request.payment)?;
        let amount = self
            .reservations
            .quote_extension(Some(user), request.reservation_id, request.hours_to_add)
            .await?;
        let payment = self.resolve_payment(user, instrument).await?;

        let key = request
            .idempotency_key
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut settlement = self
            .authorize(
                user,
                &key,
                SettlementKind::Extension,
                Some(request.reservation_id),
                amount,
                &payment.label,
            )
            .await?;

        let committed = self
            .reservations
            .extend_priced(
                Some(user),
                request.reservation_id,
                request.hours_to_add,
                Some(payment.label.clone()),
            )
            .await;

        let (reservation, added) = match committed {
            Ok(r) => r,
            Err(e) => {
                self.compensate(&mut settlement, &e).await;
                return Err(e);
            }
        };

        self.capture(&mut settlement, &reservation, added).await?;
        Ok(CheckoutReceipt {
            amount_charged: settlement.amount,
            settlement_id: settlement.id,
            reservation,
            payment_label: payment.label,
            saved_method_id: payment.saved_method_id,
            replayed: false,
        })
    }

    /// Outcome of an earlier checkout with the same key, if any. The key
    /// must have been used by the same user for the same operation.
    async fn replay(
        &self,
        user: &CurrentUser,
        key: Option<&str>,
        operation: Operation,
    ) -> DomainResult<Option<CheckoutReceipt>> {
        let Some(key) = key else {
            return Ok(None);
        };
        let Some(settlement) = self.repos.settlements().find_by_key(key).await? else {
            return Ok(None);
        };
        if settlement.user_id != user.id {
            return Err(DomainError::Forbidden(
                "idempotency key belongs to another user".into(),
            ));
        }
        if !operation.matches(&settlement, None) {
            return Err(DomainError::IdempotencyKeyReused(key.to_string()));
        }

        match (settlement.status, settlement.reservation_id) {
            (SettlementStatus::Captured, Some(reservation_id)) => {
                let reservation = self
                    .repos
                    .reservations()
                    .find_by_id(reservation_id)
                    .await?
                    .ok_or(DomainError::ReservationNotFound(reservation_id))?;
                if !operation.matches(&settlement, Some(&reservation)) {
                    return Err(DomainError::IdempotencyKeyReused(key.to_string()));
                }
                info!(idempotency_key = key, settlement_id = %settlement.id, "Replaying checkout");
                Ok(Some(CheckoutReceipt {
                    payment_label: reservation.payment_method.clone().unwrap_or_default(),
                    reservation,
                    settlement_id: settlement.id,
                    amount_charged: settlement.amount,
                    saved_method_id: None,
                    replayed: true,
                }))
            }
            (SettlementStatus::Voided, _) => Err(DomainError::Settlement(format!(
                "checkout {} already failed and was voided; retry with a new key",
                key
            ))),
            _ => Err(DomainError::Settlement(format!(
                "checkout {} is still in progress",
                key
            ))),
        }
    }

    /// Input validation only; saved methods are looked up later.
    fn validate_payment(&self, payment: &PaymentSelection) -> DomainResult<ValidatedPayment> {
        Ok(match payment {
            PaymentSelection::Saved { method_id } => ValidatedPayment::Saved(*method_id),
            PaymentSelection::New {
                input,
                save_for_future,
            } => ValidatedPayment::New {
                instrument: input.validate(Utc::now().date_naive())?,
                save_for_future: *save_for_future,
            },
        })
    }

    async fn resolve_payment(
        &self,
        user: &CurrentUser,
        payment: ValidatedPayment,
    ) -> DomainResult<ResolvedPayment> {
        match payment {
            ValidatedPayment::Saved(method_id) => {
                let method = self.vault.find(user.id, method_id).await?;
                Ok(ResolvedPayment {
                    label: method.instrument.label(),
                    saved_method_id: None,
                })
            }
            ValidatedPayment::New {
                instrument,
                save_for_future,
            } => {
                if self.vault.contains(user.id, &instrument).await? {
                    return Err(DomainError::DuplicateMethod);
                }
                let label = instrument.label();
                let saved_method_id = if save_for_future {
                    Some(self.vault.add(Some(user), instrument).await?.id)
                } else {
                    None
                };
                Ok(ResolvedPayment {
                    label,
                    saved_method_id,
                })
            }
        }
    }

    async fn authorize(
        &self,
        user: &CurrentUser,
        key: &str,
        kind: SettlementKind,
        reservation_id: Option<Uuid>,
        amount: Decimal,
        label: &str,
    ) -> DomainResult<Settlement> {
        let currency = self.currency.get().await?;
        let request = ChargeRequest {
            idempotency_key: key.to_string(),
            user_id: user.id,
            amount,
            currency: currency.code,
            instrument_label: label.to_string(),
        };
        let reference = self.gateway.authorize(&request).await?;

        let settlement =
            Settlement::authorized(key, user.id, reservation_id, kind, amount, reference);
        let inserted = with_deadline(
            self.policy.write_timeout,
            "insert_settlement",
            self.repos.settlements().insert(settlement.clone()),
        )
        .await;

        match inserted {
            Ok(true) => {
                info!(
                    settlement_id = %settlement.id,
                    kind = kind.as_str(),
                    amount = %amount,
                    "Settlement authorized"
                );
                Ok(settlement)
            }
            Ok(false) => {
                self.release(&settlement.provider_reference).await;
                Err(DomainError::Settlement(format!(
                    "checkout {} is already being processed",
                    key
                )))
            }
            Err(e) => {
                self.release(&settlement.provider_reference).await;
                Err(e)
            }
        }
    }

    async fn release(&self, reference: &str) {
        if let Err(e) = self.gateway.void(reference).await {
            error!(reference, error = %e, "Failed to void authorization");
        }
    }

    /// Void the authorization after a failed commit.
    async fn compensate(&self, settlement: &mut Settlement, cause: &DomainError) {
        warn!(
            settlement_id = %settlement.id,
            error = %cause,
            "Reservation commit failed, voiding settlement"
        );
        self.release(&settlement.provider_reference).await;
        settlement.void();
        if let Err(e) = self.repos.settlements().update(settlement.clone()).await {
            error!(settlement_id = %settlement.id, error = %e, "Failed to record voided settlement");
        }
        metrics::counter!("checkout_settlements_total", "outcome" => "voided").increment(1);
    }

    /// Capture the committed amount and link the settlement to the reservation.
    async fn capture(
        &self,
        settlement: &mut Settlement,
        reservation: &Reservation,
        amount: Decimal,
    ) -> DomainResult<()> {
        self.gateway
            .capture(&settlement.provider_reference, amount)
            .await
            .map_err(|e| {
                error!(
                    settlement_id = %settlement.id,
                    reservation_id = %reservation.id,
                    error = %e,
                    "Capture failed after commit"
                );
                DomainError::from(e)
            })?;

        settlement.amount = amount;
        settlement.capture(reservation.id);
        with_deadline(
            self.policy.write_timeout,
            "capture_settlement",
            self.repos.settlements().update(settlement.clone()),
        )
        .await?;

        metrics::counter!("checkout_settlements_total", "outcome" => "captured").increment(1);
        info!(
            settlement_id = %settlement.id,
            reservation_id = %reservation.id,
            amount = %amount,
            "Settlement captured"
        );
        Ok(())
    }
}
