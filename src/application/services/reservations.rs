//! Reservation manager
//!
//! Owns the reservation lifecycle and keeps slot status in step with it:
//! create claims the slot, end and the overdue sweep release it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::AuditLogger;
use crate::domain::audit::ActionType;
use crate::domain::pricing;
use crate::domain::reservation::Reservation;
use crate::domain::slot::Slot;
use crate::domain::user::{require_user, CurrentUser};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::utils::{read_or_empty, with_deadline, StorePolicy};

pub struct ReservationManager {
    repos: Arc<dyn RepositoryProvider>,
    audit: Arc<AuditLogger>,
    policy: StorePolicy,
}

impl ReservationManager {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        audit: Arc<AuditLogger>,
        policy: StorePolicy,
    ) -> Self {
        Self {
            repos,
            audit,
            policy,
        }
    }

    async fn slot(&self, id: Uuid) -> DomainResult<Slot> {
        self.repos
            .slots()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::SlotNotFound(id))
    }

    /// Load a reservation the actor may change and that is still Active.
    async fn active_owned(&self, actor: &CurrentUser, id: Uuid) -> DomainResult<Reservation> {
        let reservation = self
            .repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ReservationNotFound(id))?;
        if !actor.can_act_for(reservation.user_id) {
            return Err(DomainError::Forbidden(
                "reservation belongs to another user".into(),
            ));
        }
        if !reservation.is_active() {
            return Err(DomainError::ReservationNotActive(id));
        }
        Ok(reservation)
    }

    /// Price a booking of `slot_id` over `[start, end)` at the slot's
    /// current rate.
    pub async fn quote_booking(
        &self,
        slot_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<(Slot, pricing::Quote)> {
        pricing::hours_between(start, end)?;
        let slot = self.slot(slot_id).await?;
        let quote = pricing::quote(slot.price_per_hour, start, end)?;
        Ok((slot, quote))
    }

    pub async fn create(
        &self,
        actor: Option<&CurrentUser>,
        slot_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        payment_method: Option<String>,
    ) -> DomainResult<Reservation> {
        let actor = require_user(actor)?;
        pricing::hours_between(start, end)?;
        let slot = self.slot(slot_id).await?;

        let reservation = Reservation::new(
            actor.id,
            slot.id,
            start,
            end,
            slot.price_per_hour,
            payment_method,
        )?;
        with_deadline(
            self.policy.write_timeout,
            "create_reservation",
            self.repos
                .reservations()
                .create_with_slot_claim(reservation.clone()),
        )
        .await?;

        metrics::counter!("reservations_created_total").increment(1);
        info!(
            reservation_id = %reservation.id,
            slot_id = %slot.id,
            user_id = %actor.id,
            total_cost = %reservation.total_cost,
            "Reservation created"
        );
        self.audit
            .log_action(
                actor,
                ActionType::ReservationCreated,
                format!("Reserved slot {}", slot.name),
                json!({
                    "reservation_id": reservation.id,
                    "slot_id": slot.id,
                    "start_time": reservation.start_time,
                    "end_time": reservation.end_time,
                    "total_cost": reservation.total_cost,
                }),
            )
            .await;
        Ok(reservation)
    }

    /// Added cost of extending `reservation_id` by `hours_to_add` at the
    /// slot's current rate.
    pub async fn quote_extension(
        &self,
        actor: Option<&CurrentUser>,
        reservation_id: Uuid,
        hours_to_add: Decimal,
    ) -> DomainResult<Decimal> {
        let actor = require_user(actor)?;
        pricing::ensure_extension_hours(hours_to_add)?;
        let mut reservation = self.active_owned(actor, reservation_id).await?;
        let slot = self.slot(reservation.slot_id).await?;
        // Applied to the loaded copy only, so an unrepresentable end time
        // fails before anything is charged.
        reservation.extend(hours_to_add, slot.price_per_hour, None)
    }

    pub async fn extend(
        &self,
        actor: Option<&CurrentUser>,
        reservation_id: Uuid,
        hours_to_add: Decimal,
        payment_method: Option<String>,
    ) -> DomainResult<Reservation> {
        self.extend_priced(actor, reservation_id, hours_to_add, payment_method)
            .await
            .map(|(reservation, _)| reservation)
    }

    /// [`extend`](Self::extend), also returning the cost that was added.
    pub async fn extend_priced(
        &self,
        actor: Option<&CurrentUser>,
        reservation_id: Uuid,
        hours_to_add: Decimal,
        payment_method: Option<String>,
    ) -> DomainResult<(Reservation, Decimal)> {
        let actor = require_user(actor)?;
        pricing::ensure_extension_hours(hours_to_add)?;
        let mut reservation = self.active_owned(actor, reservation_id).await?;
        let slot = self.slot(reservation.slot_id).await?;

        let added = reservation.extend(hours_to_add, slot.price_per_hour, payment_method)?;
        with_deadline(
            self.policy.write_timeout,
            "extend_reservation",
            self.repos.reservations().update_active(reservation.clone()),
        )
        .await?;

        metrics::counter!("reservations_extended_total").increment(1);
        info!(
            reservation_id = %reservation.id,
            hours_added = %hours_to_add,
            added_cost = %added,
            "Reservation extended"
        );
        self.audit
            .log_action(
                actor,
                ActionType::ReservationExtended,
                format!("Extended reservation at {} by {}h", slot.name, hours_to_add),
                json!({
                    "reservation_id": reservation.id,
                    "hours_added": hours_to_add,
                    "added_cost": added,
                    "end_time": reservation.end_time,
                    "total_cost": reservation.total_cost,
                }),
            )
            .await;
        Ok((reservation, added))
    }

    /// End now: Completed, end time clamped to now, slot released.
    pub async fn end(
        &self,
        actor: Option<&CurrentUser>,
        reservation_id: Uuid,
    ) -> DomainResult<Reservation> {
        let actor = require_user(actor)?;
        let mut reservation = self.active_owned(actor, reservation_id).await?;

        reservation.end_at(Utc::now());
        with_deadline(
            self.policy.write_timeout,
            "end_reservation",
            self.repos
                .reservations()
                .complete_and_release_slot(reservation.clone()),
        )
        .await?;

        metrics::counter!("reservations_ended_total").increment(1);
        info!(reservation_id = %reservation.id, "Reservation ended");
        self.audit
            .log_action(
                actor,
                ActionType::ReservationEnded,
                "Ended reservation".to_string(),
                json!({
                    "reservation_id": reservation.id,
                    "slot_id": reservation.slot_id,
                    "total_cost": reservation.total_cost,
                }),
            )
            .await;
        Ok(reservation)
    }

    pub async fn get(&self, actor: Option<&CurrentUser>, id: Uuid) -> DomainResult<Reservation> {
        let actor = require_user(actor)?;
        let reservation = self
            .repos
            .reservations()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::ReservationNotFound(id))?;
        if !actor.can_act_for(reservation.user_id) {
            // Hide other users' reservations entirely.
            return Err(DomainError::ReservationNotFound(id));
        }
        Ok(reservation)
    }

    /// The user's Active reservation whose end time is still ahead.
    pub async fn active_for(&self, user_id: Uuid) -> DomainResult<Option<Reservation>> {
        let now = Utc::now();
        let reservations = self.repos.reservations().find_by_user(user_id).await?;
        Ok(reservations.into_iter().find(|r| r.is_current(now)))
    }

    /// Every reservation of the user, newest start time first.
    pub async fn all_for(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_by_user(user_id).await
    }

    /// Every reservation, newest start time first. Staff only.
    pub async fn list_all(&self, actor: Option<&CurrentUser>) -> DomainResult<Vec<Reservation>> {
        require_user(actor)?.require_staff()?;
        Ok(read_or_empty(
            &self.policy.bulk,
            || self.repos.reservations().find_all(),
            "list_reservations",
        )
        .await)
    }

    /// Complete Active reservations whose end time has passed and release
    /// their slots. Returns how many were completed.
    pub async fn sweep_overdue(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        let overdue = self.repos.reservations().find_overdue(now).await?;
        let mut completed = 0;

        for mut reservation in overdue {
            reservation.expire(now);
            let id = reservation.id;
            let slot_id = reservation.slot_id;
            match self
                .repos
                .reservations()
                .complete_and_release_slot(reservation)
                .await
            {
                Ok(()) => {
                    completed += 1;
                    self.audit
                        .log_system(
                            ActionType::ReservationEnded,
                            "Reservation reached its end time",
                            json!({ "reservation_id": id, "slot_id": slot_id }),
                        )
                        .await;
                }
                // Ended or extended by its owner since the query ran.
                Err(DomainError::ReservationNotActive(_) | DomainError::ReservationChanged(_)) => {}
                Err(e) => warn!(reservation_id = %id, error = %e, "Failed to complete overdue reservation"),
            }
        }

        if completed > 0 {
            metrics::counter!("reservations_expired_total").increment(completed as u64);
            info!(count = completed, "Completed overdue reservations");
        }
        Ok(completed)
    }
}
