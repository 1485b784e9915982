//! In-memory repository provider for development and testing
//!
//! One struct implements every repository trait. Cross-entity writes take
//! the slot entry lock before touching reservations, never the reverse.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::audit::{AuditLogRepository, LogFilter, SystemLog};
use crate::domain::payment_method::{PaymentMethodRepository, SavedPaymentMethod};
use crate::domain::reservation::{Reservation, ReservationRepository, ReservationStatus};
use crate::domain::settings::{CurrencySettings, SettingsRepository};
use crate::domain::settlement::{Settlement, SettlementRepository};
use crate::domain::slot::{Slot, SlotRepository, SlotStatus};
use crate::domain::user::{UserProfile, UserRepository, UserRole};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

const CURRENCY_KEY: &str = "currency";

pub struct InMemoryRepositoryProvider {
    slots: DashMap<Uuid, Slot>,
    reservations: DashMap<Uuid, Reservation>,
    payment_methods: DashMap<Uuid, Vec<SavedPaymentMethod>>,
    logs: DashMap<u64, SystemLog>,
    log_counter: AtomicU64,
    users: DashMap<Uuid, UserProfile>,
    settlements: DashMap<String, Settlement>,
    settings: DashMap<&'static str, CurrencySettings>,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            reservations: DashMap::new(),
            payment_methods: DashMap::new(),
            logs: DashMap::new(),
            log_counter: AtomicU64::new(1),
            users: DashMap::new(),
            settlements: DashMap::new(),
            settings: DashMap::new(),
        }
    }

    fn newest_first(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
        reservations.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        reservations
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn slots(&self) -> &dyn SlotRepository {
        self
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        self
    }

    fn payment_methods(&self) -> &dyn PaymentMethodRepository {
        self
    }

    fn audit_logs(&self) -> &dyn AuditLogRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn settlements(&self) -> &dyn SettlementRepository {
        self
    }

    fn settings(&self) -> &dyn SettingsRepository {
        self
    }
}

// ── Slots ──────────────────────────────────────────────────────

#[async_trait]
impl SlotRepository for InMemoryRepositoryProvider {
    async fn save(&self, slot: Slot) -> DomainResult<()> {
        match self.slots.entry(slot.id) {
            Entry::Occupied(_) => Err(DomainError::Storage(format!(
                "slot {} already exists",
                slot.id
            ))),
            Entry::Vacant(v) => {
                v.insert(slot);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Slot>> {
        Ok(self.slots.get(&id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Slot>> {
        let mut slots: Vec<Slot> = self.slots.iter().map(|e| e.value().clone()).collect();
        slots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(slots)
    }

    async fn update(&self, slot: Slot) -> DomainResult<()> {
        match self.slots.get_mut(&slot.id) {
            Some(mut existing) => {
                let status = existing.status;
                *existing = slot;
                existing.status = status;
                Ok(())
            }
            None => Err(DomainError::SlotNotFound(slot.id)),
        }
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.slots.remove(&id).is_some())
    }

    async fn set_status(&self, id: Uuid, status: SlotStatus) -> DomainResult<Option<Slot>> {
        Ok(self.slots.get_mut(&id).map(|mut slot| {
            slot.status = status;
            slot.updated_at = Utc::now();
            slot.clone()
        }))
    }
}

// ── Reservations ───────────────────────────────────────────────

fn check_writable(stored: &Reservation, update: &Reservation) -> DomainResult<()> {
    if stored.status != ReservationStatus::Active {
        return Err(DomainError::ReservationNotActive(update.id));
    }
    if stored.version != update.base_version() {
        return Err(DomainError::ReservationChanged(update.id));
    }
    Ok(())
}

#[async_trait]
impl ReservationRepository for InMemoryRepositoryProvider {
    async fn create_with_slot_claim(&self, reservation: Reservation) -> DomainResult<()> {
        let mut slot = self
            .slots
            .get_mut(&reservation.slot_id)
            .ok_or(DomainError::SlotNotFound(reservation.slot_id))?;
        if slot.status != SlotStatus::Available {
            return Err(DomainError::SlotUnavailable(slot.id));
        }
        slot.status = SlotStatus::Reserved;
        slot.updated_at = Utc::now();
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        Ok(Self::newest_first(
            self.reservations
                .iter()
                .filter(|e| e.user_id == user_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        Ok(Self::newest_first(
            self.reservations.iter().map(|e| e.value().clone()).collect(),
        ))
    }

    async fn find_active_for_slot(&self, slot_id: Uuid) -> DomainResult<Option<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .find(|e| e.slot_id == slot_id && e.status == ReservationStatus::Active)
            .map(|e| e.value().clone()))
    }

    async fn update_active(&self, reservation: Reservation) -> DomainResult<()> {
        let mut stored = self
            .reservations
            .get_mut(&reservation.id)
            .ok_or(DomainError::ReservationNotFound(reservation.id))?;
        check_writable(&stored, &reservation)?;
        *stored = reservation;
        Ok(())
    }

    async fn complete_and_release_slot(&self, reservation: Reservation) -> DomainResult<()> {
        // Slot lock first; a deleted slot still lets the reservation complete.
        let slot = self.slots.get_mut(&reservation.slot_id);
        let mut stored = self
            .reservations
            .get_mut(&reservation.id)
            .ok_or(DomainError::ReservationNotFound(reservation.id))?;
        check_writable(&stored, &reservation)?;
        *stored = reservation;
        if let Some(mut slot) = slot {
            slot.status = SlotStatus::Available;
            slot.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|e| e.status == ReservationStatus::Active && e.end_time < now)
            .map(|e| e.value().clone())
            .collect())
    }
}

// ── Payment methods ────────────────────────────────────────────

#[async_trait]
impl PaymentMethodRepository for InMemoryRepositoryProvider {
    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<SavedPaymentMethod>> {
        Ok(self
            .payment_methods
            .get(&user_id)
            .map(|m| m.clone())
            .unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> DomainResult<Option<SavedPaymentMethod>> {
        Ok(self
            .payment_methods
            .get(&user_id)
            .and_then(|methods| methods.iter().find(|m| m.id == id).cloned()))
    }

    async fn insert_if_unique(&self, method: SavedPaymentMethod) -> DomainResult<()> {
        let mut methods = self.payment_methods.entry(method.user_id).or_default();
        if methods.iter().any(|m| m.is_same_method(&method.instrument)) {
            return Err(DomainError::DuplicateMethod);
        }
        methods.push(method);
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<bool> {
        Ok(match self.payment_methods.get_mut(&user_id) {
            Some(mut methods) => {
                let before = methods.len();
                methods.retain(|m| m.id != id);
                methods.len() != before
            }
            None => false,
        })
    }
}

// ── Audit logs ─────────────────────────────────────────────────

#[async_trait]
impl AuditLogRepository for InMemoryRepositoryProvider {
    async fn append(&self, log: SystemLog) -> DomainResult<()> {
        let seq = self.log_counter.fetch_add(1, Ordering::SeqCst);
        self.logs.insert(seq, log);
        Ok(())
    }

    async fn find(&self, filter: &LogFilter) -> DomainResult<Vec<SystemLog>> {
        let mut matching: Vec<(u64, SystemLog)> = self
            .logs
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        matching.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(matching.into_iter().map(|(_, log)| log).collect())
    }
}

// ── Users ──────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for InMemoryRepositoryProvider {
    async fn upsert(&self, profile: UserProfile) -> DomainResult<UserProfile> {
        let mut entry = self.users.entry(profile.id).or_insert_with(|| profile.clone());
        entry.email = profile.email;
        entry.name = profile.name;
        entry.last_seen_at = profile.last_seen_at;
        Ok(entry.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<UserProfile>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<UserProfile>> {
        let mut users: Vec<UserProfile> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> DomainResult<Option<UserProfile>> {
        Ok(self.users.get_mut(&id).map(|mut u| {
            u.role = role;
            u.clone()
        }))
    }
}

// ── Settlements ────────────────────────────────────────────────

#[async_trait]
impl SettlementRepository for InMemoryRepositoryProvider {
    async fn insert(&self, settlement: Settlement) -> DomainResult<bool> {
        match self.settlements.entry(settlement.idempotency_key.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(v) => {
                v.insert(settlement);
                Ok(true)
            }
        }
    }

    async fn find_by_key(&self, idempotency_key: &str) -> DomainResult<Option<Settlement>> {
        Ok(self.settlements.get(idempotency_key).map(|s| s.clone()))
    }

    async fn update(&self, settlement: Settlement) -> DomainResult<()> {
        self.settlements
            .insert(settlement.idempotency_key.clone(), settlement);
        Ok(())
    }
}

// ── Settings ───────────────────────────────────────────────────

#[async_trait]
impl SettingsRepository for InMemoryRepositoryProvider {
    async fn get_currency(&self) -> DomainResult<Option<CurrencySettings>> {
        Ok(self.settings.get(CURRENCY_KEY).map(|c| c.clone()))
    }

    async fn set_currency(&self, settings: CurrencySettings) -> DomainResult<()> {
        self.settings.insert(CURRENCY_KEY, settings);
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::Duration;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::payment_method::PaymentInstrument;
    use crate::domain::slot::{GeoPoint, SlotDraft, VehicleType};

    fn slot() -> Slot {
        Slot::from_draft(
            SlotDraft {
                name: "B2".into(),
                location: GeoPoint { lat: 23.8, lon: 90.4 },
                address: "Banani".into(),
                status: None,
                vehicle_type: VehicleType::Car,
                price_per_hour: Decimal::from(50),
                features: BTreeSet::new(),
                operating_hours: "24/7".into(),
                rating: None,
                review_count: None,
            },
            Utc::now(),
        )
    }

    fn reservation(slot: &Slot) -> Reservation {
        let start = Utc::now();
        Reservation::new(
            Uuid::new_v4(),
            slot.id,
            start,
            start + Duration::hours(1),
            slot.price_per_hour,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn slot_claim_is_exclusive() {
        let store = Arc::new(InMemoryRepositoryProvider::new());
        let s = slot();
        store.slots().save(s.clone()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let r = reservation(&s);
                tokio::spawn(async move { store.reservations().create_with_slot_claim(r).await })
            })
            .collect();

        let mut won = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(()) => won += 1,
                Err(DomainError::SlotUnavailable(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(store.reservations().find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn completing_twice_is_rejected() {
        let store = InMemoryRepositoryProvider::new();
        let s = slot();
        store.slots().save(s.clone()).await.unwrap();
        let mut r = reservation(&s);
        store.reservations().create_with_slot_claim(r.clone()).await.unwrap();

        r.end_at(Utc::now());
        store.reservations().complete_and_release_slot(r.clone()).await.unwrap();
        let released = store.slots().find_by_id(s.id).await.unwrap().unwrap();
        assert_eq!(released.status, SlotStatus::Available);

        assert!(matches!(
            store.reservations().complete_and_release_slot(r).await,
            Err(DomainError::ReservationNotActive(_))
        ));
    }

    #[tokio::test]
    async fn write_from_a_stale_read_is_rejected() {
        let store = InMemoryRepositoryProvider::new();
        let s = slot();
        store.slots().save(s.clone()).await.unwrap();
        let r = reservation(&s);
        store.reservations().create_with_slot_claim(r.clone()).await.unwrap();

        let mut first = r.clone();
        let mut second = r.clone();
        first.extend(Decimal::ONE, s.price_per_hour, None).unwrap();
        second.extend(Decimal::ONE, s.price_per_hour, None).unwrap();

        store.reservations().update_active(first.clone()).await.unwrap();
        assert!(matches!(
            store.reservations().update_active(second).await,
            Err(DomainError::ReservationChanged(_))
        ));
        let mut ended = r;
        ended.end_at(Utc::now());
        assert!(matches!(
            store.reservations().complete_and_release_slot(ended).await,
            Err(DomainError::ReservationChanged(_))
        ));

        let stored = store.reservations().find_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cost, Decimal::from(100));
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn duplicate_payment_method_is_rejected() {
        let store = InMemoryRepositoryProvider::new();
        let user = Uuid::new_v4();
        let card = |name: &str| PaymentInstrument::Card {
            cardholder_name: name.into(),
            last4: "1234".into(),
            expiry_date: "12/30".into(),
        };
        store
            .payment_methods()
            .insert_if_unique(SavedPaymentMethod::new(user, card("John Doe")))
            .await
            .unwrap();
        assert!(matches!(
            store
                .payment_methods()
                .insert_if_unique(SavedPaymentMethod::new(user, card("john doe")))
                .await,
            Err(DomainError::DuplicateMethod)
        ));
        // Another user may save the same card.
        store
            .payment_methods()
            .insert_if_unique(SavedPaymentMethod::new(Uuid::new_v4(), card("John Doe")))
            .await
            .unwrap();
        assert_eq!(store.payment_methods().find_by_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_keeps_stored_role() {
        let store = InMemoryRepositoryProvider::new();
        let id = Uuid::new_v4();
        let now = Utc::now();
        let profile = UserProfile {
            id,
            email: "a@example.com".into(),
            name: "A".into(),
            role: UserRole::User,
            created_at: now,
            last_seen_at: now,
        };
        store.users().upsert(profile.clone()).await.unwrap();
        store.users().set_role(id, UserRole::Admin).await.unwrap();

        let again = store
            .users()
            .upsert(UserProfile {
                name: "A. Renamed".into(),
                ..profile
            })
            .await
            .unwrap();
        assert_eq!(again.role, UserRole::Admin);
        assert_eq!(again.name, "A. Renamed");
    }
}
