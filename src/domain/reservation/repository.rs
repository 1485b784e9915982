//! Reservation repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::Reservation;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert an Active reservation and move its slot from `Available` to
    /// `Reserved` in one transaction.
    ///
    /// Fails with `SlotNotFound` when the slot is missing and with
    /// `SlotUnavailable` when it is not `Available`; nothing is written then.
    async fn create_with_slot_claim(&self, reservation: Reservation) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Reservation>>;

    /// All reservations of a user, newest start time first
    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>>;

    /// All reservations, newest start time first
    async fn find_all(&self) -> DomainResult<Vec<Reservation>>;

    async fn find_active_for_slot(&self, slot_id: Uuid) -> DomainResult<Option<Reservation>>;

    /// Overwrite a reservation that is still `Active` and still at
    /// `reservation.base_version()` in the store.
    ///
    /// `ReservationNotActive` when it has ended, `ReservationChanged` when
    /// another write landed since it was read.
    async fn update_active(&self, reservation: Reservation) -> DomainResult<()>;

    /// Write a completed reservation and set its slot `Available` in one
    /// transaction. Same preconditions as [`update_active`](Self::update_active).
    async fn complete_and_release_slot(&self, reservation: Reservation) -> DomainResult<()>;

    /// Active reservations whose end time is before `now`
    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>>;
}
