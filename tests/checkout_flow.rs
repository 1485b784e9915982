//! Checkout against a store whose reservation commit can be made to fail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use park_eazy::application::services::{BookingRequest, ExtensionRequest, PaymentSelection};
use park_eazy::domain::audit::AuditLogRepository;
use park_eazy::domain::payment_method::{CardInput, PaymentInput, PaymentMethodRepository};
use park_eazy::domain::reservation::ReservationRepository;
use park_eazy::domain::settings::SettingsRepository;
use park_eazy::domain::settlement::SettlementRepository;
use park_eazy::domain::slot::SlotRepository;
use park_eazy::domain::user::UserRepository;
use park_eazy::domain::{
    ActionType, CurrencySettings, CurrentUser, DomainError, DomainResult, GeoPoint,
    RepositoryProvider, Reservation, SettlementStatus, SlotDraft, SlotStatus, UserRole,
    VehicleType,
};
use park_eazy::infrastructure::payment::SimulatedChargeState;
use park_eazy::shared::{BulkReadPolicy, RetryConfig, StorePolicy};
use park_eazy::{create_event_bus, AppServices, InMemoryRepositoryProvider, SimulatedGateway};

/// Delegates to the in-memory store; reservation inserts fail while
/// `fail_commits` is set, and reads yield to other tasks while
/// `yield_on_read` is set.
struct FlakyReservations {
    inner: Arc<InMemoryRepositoryProvider>,
    fail_commits: AtomicBool,
    yield_on_read: AtomicBool,
}

#[async_trait]
impl ReservationRepository for FlakyReservations {
    async fn create_with_slot_claim(&self, reservation: Reservation) -> DomainResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(DomainError::Storage("disk full".into()));
        }
        self.inner.reservations().create_with_slot_claim(reservation).await
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Reservation>> {
        let found = self.inner.reservations().find_by_id(id).await;
        if self.yield_on_read.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        found
    }

    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        self.inner.reservations().find_by_user(user_id).await
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        self.inner.reservations().find_all().await
    }

    async fn find_active_for_slot(&self, slot_id: Uuid) -> DomainResult<Option<Reservation>> {
        self.inner.reservations().find_active_for_slot(slot_id).await
    }

    async fn update_active(&self, reservation: Reservation) -> DomainResult<()> {
        self.inner.reservations().update_active(reservation).await
    }

    async fn complete_and_release_slot(&self, reservation: Reservation) -> DomainResult<()> {
        self.inner
            .reservations()
            .complete_and_release_slot(reservation)
            .await
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>> {
        self.inner.reservations().find_overdue(now).await
    }
}

struct FlakyProvider {
    inner: Arc<InMemoryRepositoryProvider>,
    reservations: FlakyReservations,
}

impl FlakyProvider {
    fn new() -> Self {
        let inner = Arc::new(InMemoryRepositoryProvider::new());
        Self {
            reservations: FlakyReservations {
                inner: inner.clone(),
                fail_commits: AtomicBool::new(false),
                yield_on_read: AtomicBool::new(false),
            },
            inner,
        }
    }

    fn fail_commits(&self, fail: bool) {
        self.reservations.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn interleave_reads(&self, on: bool) {
        self.reservations.yield_on_read.store(on, Ordering::SeqCst);
    }
}

impl RepositoryProvider for FlakyProvider {
    fn slots(&self) -> &dyn SlotRepository {
        self.inner.slots()
    }
    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }
    fn payment_methods(&self) -> &dyn PaymentMethodRepository {
        self.inner.payment_methods()
    }
    fn audit_logs(&self) -> &dyn AuditLogRepository {
        self.inner.audit_logs()
    }
    fn users(&self) -> &dyn UserRepository {
        self.inner.users()
    }
    fn settlements(&self) -> &dyn SettlementRepository {
        self.inner.settlements()
    }
    fn settings(&self) -> &dyn SettingsRepository {
        self.inner.settings()
    }
}

struct Harness {
    services: AppServices,
    provider: Arc<FlakyProvider>,
    gateway: Arc<SimulatedGateway>,
}

fn harness() -> Harness {
    let provider = Arc::new(FlakyProvider::new());
    let gateway = Arc::new(SimulatedGateway::new());
    let policy = StorePolicy {
        write_timeout: StdDuration::from_secs(2),
        bulk: BulkReadPolicy {
            retry: RetryConfig {
                max_attempts: 1,
                initial_delay: StdDuration::from_millis(1),
                backoff_multiplier: 1.0,
                max_delay: StdDuration::from_millis(1),
            },
            attempt_timeout: StdDuration::from_secs(2),
            timeout_ceiling: StdDuration::from_secs(2),
        },
    };
    let services = AppServices::new(
        provider.clone(),
        gateway.clone(),
        create_event_bus(),
        policy,
        CurrencySettings::default(),
    );
    Harness {
        services,
        provider,
        gateway,
    }
}

fn session(role: UserRole) -> CurrentUser {
    let id = Uuid::new_v4();
    CurrentUser {
        id,
        email: format!("{}@example.com", id.simple()),
        name: "Nadia Islam".into(),
        role,
    }
}

fn card_payment(save_for_future: bool) -> PaymentSelection {
    let year = (Utc::now().year() + 2) % 100;
    PaymentSelection::New {
        input: PaymentInput::Card(CardInput {
            card_number: "5555 5555 5555 4444".into(),
            expiry_date: format!("08/{:02}", year),
            cvc: "321".into(),
            cardholder_name: "Nadia Islam".into(),
        }),
        save_for_future,
    }
}

async fn add_slot(services: &AppServices) -> Uuid {
    let admin = session(UserRole::Admin);
    services
        .slots
        .add(
            Some(&admin),
            SlotDraft {
                name: "Gulshan Plaza P1".into(),
                location: GeoPoint {
                    lat: 23.7925,
                    lon: 90.4078,
                },
                address: "Gulshan Avenue, Dhaka".into(),
                status: None,
                vehicle_type: VehicleType::Suv,
                price_per_hour: Decimal::from(80),
                features: Default::default(),
                operating_hours: "06:00-23:00".into(),
                rating: None,
                review_count: None,
            },
        )
        .await
        .unwrap()
        .id
}

fn booking(slot_id: Uuid, key: &str, save_for_future: bool) -> BookingRequest {
    let start = Utc::now() + Duration::minutes(10);
    BookingRequest {
        slot_id,
        start_time: start,
        end_time: start + Duration::hours(3),
        payment: card_payment(save_for_future),
        idempotency_key: Some(key.into()),
    }
}

#[tokio::test]
async fn failed_commit_voids_the_settlement() {
    let h = harness();
    let driver = session(UserRole::User);
    let slot_id = add_slot(&h.services).await;

    h.provider.fail_commits(true);
    let result = h
        .services
        .checkout
        .book(Some(&driver), booking(slot_id, "attempt-1", false))
        .await;
    assert!(matches!(result, Err(DomainError::Storage(_))));

    let settlement = h
        .services
        .repos
        .settlements()
        .find_by_key("attempt-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settlement.status, SettlementStatus::Voided);
    assert_eq!(settlement.reservation_id, None);
    assert_eq!(
        h.gateway.state_of(&settlement.provider_reference),
        Some(SimulatedChargeState::Voided)
    );
    assert_eq!(h.gateway.voided_count(), 1);
    assert_eq!(h.gateway.captured_count(), 0);
    assert_eq!(
        h.services.slots.get(slot_id).await.unwrap().status,
        SlotStatus::Available
    );

    // The voided key stays spent even once the store recovers.
    h.provider.fail_commits(false);
    assert!(matches!(
        h.services
            .checkout
            .book(Some(&driver), booking(slot_id, "attempt-1", false))
            .await,
        Err(DomainError::Settlement(_))
    ));

    let receipt = h
        .services
        .checkout
        .book(Some(&driver), booking(slot_id, "attempt-2", false))
        .await
        .unwrap();
    assert_eq!(receipt.amount_charged, Decimal::from(240));
    assert_eq!(h.gateway.captured_count(), 1);
}

#[tokio::test]
async fn completed_checkout_is_announced_to_the_user() {
    let h = harness();
    let driver = session(UserRole::User);
    let slot_id = add_slot(&h.services).await;
    let mut events = h.services.events.subscribe();

    let receipt = h
        .services
        .checkout
        .book(Some(&driver), booking(slot_id, "notify-1", true))
        .await
        .unwrap();
    assert!(receipt.saved_method_id.is_some());

    let mut seen = Vec::new();
    while seen.len() < 2 {
        let event = tokio::time::timeout(StdDuration::from_secs(1), events.recv())
            .await
            .expect("notification in time")
            .expect("bus open");
        if event.is_for(&driver) {
            seen.push(event.action_type);
        }
    }
    assert!(seen.contains(&ActionType::PaymentMethodAdded));
    assert!(seen.contains(&ActionType::ReservationCreated));

    let logged = h
        .services
        .audit
        .list(
            Some(&session(UserRole::SuperAdmin)),
            Default::default(),
            Default::default(),
        )
        .await
        .unwrap();
    assert!(logged
        .items
        .iter()
        .any(|log| log.actor_id == Some(driver.id)
            && log.action_type == ActionType::ReservationCreated));
}

fn extension(reservation_id: Uuid, key: &str) -> ExtensionRequest {
    ExtensionRequest {
        reservation_id,
        hours_to_add: Decimal::ONE,
        payment: card_payment(false),
        idempotency_key: Some(key.into()),
    }
}

#[tokio::test]
async fn concurrent_extensions_never_lose_a_paid_hour() {
    let h = harness();
    let driver = session(UserRole::User);
    let slot_id = add_slot(&h.services).await;
    let booked = h
        .services
        .checkout
        .book(Some(&driver), booking(slot_id, "base", false))
        .await
        .unwrap();
    assert_eq!(booked.reservation.total_cost, Decimal::from(240));

    // Both extensions read the reservation before either writes it.
    h.provider.interleave_reads(true);
    let (a, b) = tokio::join!(
        h.services
            .checkout
            .extend(Some(&driver), extension(booked.reservation.id, "ext-a")),
        h.services
            .checkout
            .extend(Some(&driver), extension(booked.reservation.id, "ext-b")),
    );
    h.provider.interleave_reads(false);

    let (won, lost_key) = match (&a, &b) {
        (Ok(r), Err(DomainError::ReservationChanged(_))) => (r, "ext-b"),
        (Err(DomainError::ReservationChanged(_)), Ok(r)) => (r, "ext-a"),
        other => panic!("expected exactly one extension to win, got {other:?}"),
    };
    assert_eq!(won.amount_charged, Decimal::from(80));

    let lost = h
        .services
        .repos
        .settlements()
        .find_by_key(lost_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lost.status, SettlementStatus::Voided);
    assert_eq!(h.gateway.captured_count(), 2);
    assert_eq!(h.gateway.voided_count(), 1);

    let stored = h
        .services
        .reservations
        .get(Some(&driver), booked.reservation.id)
        .await
        .unwrap();
    assert_eq!(stored.total_cost, Decimal::from(320));
    assert_eq!(stored.end_time, booked.reservation.end_time + Duration::hours(1));

    // A fresh attempt applies on top of the winner.
    let retried = h
        .services
        .checkout
        .extend(Some(&driver), extension(booked.reservation.id, "ext-c"))
        .await
        .unwrap();
    assert_eq!(retried.reservation.total_cost, Decimal::from(400));
    assert_eq!(
        retried.reservation.end_time,
        booked.reservation.end_time + Duration::hours(2)
    );
}
