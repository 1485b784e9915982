//! Slot registry: slot catalogue and admin CRUD

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::AuditLogger;
use crate::domain::audit::ActionType;
use crate::domain::slot::{Slot, SlotDraft, SlotFilter, SlotStatus};
use crate::domain::user::{require_user, CurrentUser};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::utils::{with_deadline, StorePolicy};

pub struct SlotRegistry {
    repos: Arc<dyn RepositoryProvider>,
    audit: Arc<AuditLogger>,
    policy: StorePolicy,
}

impl SlotRegistry {
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

    pub async fn list(&self) -> DomainResult<Vec<Slot>> {
        self.repos.slots().find_all().await
    }

    pub async fn search(&self, filter: &SlotFilter) -> DomainResult<Vec<Slot>> {
        let slots = self.repos.slots().find_all().await?;
        Ok(slots.into_iter().filter(|s| filter.matches(s)).collect())
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Slot> {
        self.repos
            .slots()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::SlotNotFound(id))
    }

    pub async fn add(&self, actor: Option<&CurrentUser>, draft: SlotDraft) -> DomainResult<Slot> {
        let actor = require_user(actor)?;
        actor.require_staff()?;
        draft.validate()?;

        let slot = Slot::from_draft(draft, Utc::now());
        with_deadline(
            self.policy.write_timeout,
            "create_slot",
            self.repos.slots().save(slot.clone()),
        )
        .await?;

        info!(slot_id = %slot.id, name = %slot.name, "Slot created");
        self.audit
            .log_action(
                actor,
                ActionType::SlotCreated,
                format!("Created slot {}", slot.name),
                json!({ "slot_id": slot.id, "price_per_hour": slot.price_per_hour }),
            )
            .await;
        Ok(slot)
    }

    pub async fn update(
        &self,
        actor: Option<&CurrentUser>,
        id: Uuid,
        draft: SlotDraft,
    ) -> DomainResult<Slot> {
        let actor = require_user(actor)?;
        actor.require_staff()?;
        draft.validate()?;

        let mut slot = self.get(id).await?;
        let old_price = slot.price_per_hour;
        let new_status = draft.status;
        slot.apply(draft, Utc::now());
        with_deadline(
            self.policy.write_timeout,
            "update_slot",
            self.repos.slots().update(slot.clone()),
        )
        .await?;
        // Status is only written when asked for; a claim may have landed
        // since the read above.
        let slot = match new_status {
            Some(status) => with_deadline(
                self.policy.write_timeout,
                "set_slot_status",
                self.repos.slots().set_status(id, status),
            )
            .await?
            .ok_or(DomainError::SlotNotFound(id))?,
            None => self.get(id).await?,
        };

        info!(slot_id = %id, "Slot updated");
        self.audit
            .log_action(
                actor,
                ActionType::SlotUpdated,
                format!("Updated slot {}", slot.name),
                json!({
                    "slot_id": id,
                    "old_price_per_hour": old_price,
                    "price_per_hour": slot.price_per_hour,
                }),
            )
            .await;
        Ok(slot)
    }

    /// Delete a slot. Slots with an Active reservation cannot be removed.
    pub async fn remove(&self, actor: Option<&CurrentUser>, id: Uuid) -> DomainResult<()> {
        let actor = require_user(actor)?;
        actor.require_staff()?;

        let slot = self.get(id).await?;
        if self
            .repos
            .reservations()
            .find_active_for_slot(id)
            .await?
            .is_some()
        {
            return Err(DomainError::SlotInUse(id));
        }

        let deleted = with_deadline(
            self.policy.write_timeout,
            "delete_slot",
            self.repos.slots().delete(id),
        )
        .await?;
        if !deleted {
            return Err(DomainError::SlotNotFound(id));
        }

        info!(slot_id = %id, "Slot deleted");
        self.audit
            .log_action(
                actor,
                ActionType::SlotDeleted,
                format!("Deleted slot {}", slot.name),
                json!({ "slot_id": id }),
            )
            .await;
        Ok(())
    }

    /// Admin override of a slot's status.
    pub async fn set_status(
        &self,
        actor: Option<&CurrentUser>,
        id: Uuid,
        status: SlotStatus,
    ) -> DomainResult<Slot> {
        let actor = require_user(actor)?;
        actor.require_staff()?;

        let slot = with_deadline(
            self.policy.write_timeout,
            "set_slot_status",
            self.repos.slots().set_status(id, status),
        )
        .await?
        .ok_or(DomainError::SlotNotFound(id))?;

        info!(slot_id = %id, %status, "Slot status changed");
        self.audit
            .log_action(
                actor,
                ActionType::SlotStatusChanged,
                format!("Slot {} is now {}", slot.name, status),
                json!({ "slot_id": id, "status": status }),
            )
            .await;
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;
    use crate::application::services::testing::{draft, fixture, user};
    use crate::domain::slot::VehicleType;
    use crate::domain::user::UserRole;

    #[tokio::test]
    async fn only_staff_manage_slots() {
        let fx = fixture();
        let driver = user(UserRole::User);
        let admin = user(UserRole::Admin);

        let err = fx
            .services
            .slots
            .add(Some(&driver), draft("A1", 50))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(matches!(
            fx.services.slots.add(None, draft("A1", 50)).await,
            Err(DomainError::UserNotAuthenticated)
        ));

        let slot = fx.services.slots.add(Some(&admin), draft("A1", 50)).await.unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert_eq!(fx.services.slots.get(slot.id).await.unwrap(), slot);
    }

    #[tokio::test]
    async fn invalid_draft_reports_fields() {
        let fx = fixture();
        let admin = user(UserRole::Admin);
        let mut bad = draft(" ", -1);
        bad.rating = Some(Decimal::from(6));

        match fx.services.slots.add(Some(&admin), bad).await {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.has("name"));
                assert!(errors.has("price_per_hour"));
                assert!(errors.has("rating"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(fx.services.slots.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_applies_every_filter() {
        let fx = fixture();
        let admin = user(UserRole::Admin);
        let cheap = fx.slot("Cheap", 40).await;
        fx.slot("Pricey", 200).await;
        let mut bike = draft("Bike Bay", 20);
        bike.vehicle_type = VehicleType::Bike;
        bike.features.clear();
        fx.services.slots.add(Some(&admin), bike).await.unwrap();

        let filter = SlotFilter {
            vehicle_type: Some(VehicleType::Car),
            max_price: Some(Decimal::from(100)),
            feature: Some("cctv".into()),
            available_only: true,
        };
        let found = fx.services.slots.search(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, cheap.id);

        fx.services
            .slots
            .set_status(Some(&admin), cheap.id, SlotStatus::Occupied)
            .await
            .unwrap();
        assert!(fx.services.slots.search(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_identity_and_status() {
        let fx = fixture();
        let admin = user(UserRole::Admin);
        let slot = fx.slot("A1", 50).await;

        let updated = fx
            .services
            .slots
            .update(Some(&admin), slot.id, draft("A1 (covered)", 75))
            .await
            .unwrap();
        assert_eq!(updated.id, slot.id);
        assert_eq!(updated.created_at, slot.created_at);
        assert_eq!(updated.status, SlotStatus::Available);
        assert_eq!(updated.price_per_hour, Decimal::from(75));

        let missing = Uuid::new_v4();
        assert!(matches!(
            fx.services.slots.update(Some(&admin), missing, draft("X", 1)).await,
            Err(DomainError::SlotNotFound(id)) if id == missing
        ));
        assert!(matches!(
            fx.services
                .slots
                .set_status(Some(&admin), missing, SlotStatus::Available)
                .await,
            Err(DomainError::SlotNotFound(_))
        ));
    }

    #[tokio::test]
    async fn edit_from_a_stale_read_keeps_the_booking_claim() {
        let fx = fixture();
        let admin = user(UserRole::Admin);
        let slot = fx.slot("A1", 50).await;
        let start = Utc::now();

        // Slot read as Available, then booked before the edit is written.
        let mut stale = fx.services.slots.get(slot.id).await.unwrap();
        fx.services
            .reservations
            .create(Some(&user(UserRole::User)), slot.id, start, start + Duration::hours(1), None)
            .await
            .unwrap();
        stale.apply(draft("A1 (renamed)", 60), Utc::now());
        fx.services.repos.slots().update(stale).await.unwrap();

        let stored = fx.services.slots.get(slot.id).await.unwrap();
        assert_eq!(stored.status, SlotStatus::Reserved);
        assert_eq!(stored.name, "A1 (renamed)");
        assert!(matches!(
            fx.services
                .reservations
                .create(Some(&user(UserRole::User)), slot.id, start, start + Duration::hours(1), None)
                .await,
            Err(DomainError::SlotUnavailable(_))
        ));

        // Through the service, an edit without a status reports the live one.
        let updated = fx
            .services
            .slots
            .update(Some(&admin), slot.id, draft("A1", 70))
            .await
            .unwrap();
        assert_eq!(updated.status, SlotStatus::Reserved);

        let mut reopen = draft("A1", 70);
        reopen.status = Some(SlotStatus::Available);
        let reopened = fx
            .services
            .slots
            .update(Some(&admin), slot.id, reopen)
            .await
            .unwrap();
        assert_eq!(reopened.status, SlotStatus::Available);
    }

    #[tokio::test]
    async fn slot_with_active_reservation_cannot_be_removed() {
        let fx = fixture();
        let admin = user(UserRole::Admin);
        let driver = user(UserRole::User);
        let slot = fx.slot("A1", 50).await;

        let start = Utc::now();
        let reservation = fx
            .services
            .reservations
            .create(Some(&driver), slot.id, start, start + Duration::hours(2), None)
            .await
            .unwrap();

        assert!(matches!(
            fx.services.slots.remove(Some(&admin), slot.id).await,
            Err(DomainError::SlotInUse(_))
        ));

        fx.services
            .reservations
            .end(Some(&driver), reservation.id)
            .await
            .unwrap();
        fx.services.slots.remove(Some(&admin), slot.id).await.unwrap();
        assert!(matches!(
            fx.services.slots.get(slot.id).await,
            Err(DomainError::SlotNotFound(_))
        ));
    }
}
