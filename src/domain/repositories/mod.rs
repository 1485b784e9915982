//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::audit::AuditLogRepository;
use super::payment_method::PaymentMethodRepository;
use super::reservation::ReservationRepository;
use super::settings::SettingsRepository;
use super::settlement::SettlementRepository;
use super::slot::SlotRepository;
use super::user::UserRepository;
use crate::shared::types::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Services hold an `Arc<dyn RepositoryProvider>` and request only the
/// repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) -> DomainResult<()> {
///     let slot = repos.slots().find_by_id(slot_id).await?;
///     let active = repos.reservations().find_active_for_slot(slot_id).await?;
///     Ok(())
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn slots(&self) -> &dyn SlotRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn payment_methods(&self) -> &dyn PaymentMethodRepository;
    fn audit_logs(&self) -> &dyn AuditLogRepository;
    fn users(&self) -> &dyn UserRepository;
    fn settlements(&self) -> &dyn SettlementRepository;
    fn settings(&self) -> &dyn SettingsRepository;
}
