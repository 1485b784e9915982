//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::audit::AuditLogRepository;
use crate::domain::payment_method::PaymentMethodRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;
use crate::domain::settings::SettingsRepository;
use crate::domain::settlement::SettlementRepository;
use crate::domain::slot::SlotRepository;
use crate::domain::user::UserRepository;

use super::audit_log_repository::SeaOrmAuditLogRepository;
use super::payment_method_repository::SeaOrmPaymentMethodRepository;
use super::reservation_repository::SeaOrmReservationRepository;
use super::settings_repository::SeaOrmSettingsRepository;
use super::settlement_repository::SeaOrmSettlementRepository;
use super::slot_repository::SeaOrmSlotRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let slot = repos.slots().find_by_id(slot_id).await?;
/// let mine = repos.reservations().find_by_user(user_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    slots: SeaOrmSlotRepository,
    reservations: SeaOrmReservationRepository,
    payment_methods: SeaOrmPaymentMethodRepository,
    audit_logs: SeaOrmAuditLogRepository,
    users: SeaOrmUserRepository,
    settlements: SeaOrmSettlementRepository,
    settings: SeaOrmSettingsRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            slots: SeaOrmSlotRepository::new(db.clone()),
            reservations: SeaOrmReservationRepository::new(db.clone()),
            payment_methods: SeaOrmPaymentMethodRepository::new(db.clone()),
            audit_logs: SeaOrmAuditLogRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db.clone()),
            settlements: SeaOrmSettlementRepository::new(db.clone()),
            settings: SeaOrmSettingsRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn slots(&self) -> &dyn SlotRepository {
        &self.slots
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn payment_methods(&self) -> &dyn PaymentMethodRepository {
        &self.payment_methods
    }

    fn audit_logs(&self) -> &dyn AuditLogRepository {
        &self.audit_logs
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn settlements(&self) -> &dyn SettlementRepository {
        &self.settlements
    }

    fn settings(&self) -> &dyn SettingsRepository {
        &self.settings
    }
}
