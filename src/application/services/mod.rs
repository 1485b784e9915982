//! Application services

mod audit;
mod checkout;
mod currency;
mod payment_vault;
mod reservation_sweeper;
mod reservations;
mod slot_registry;
mod users;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use audit::AuditLogger;
pub use checkout::{
    BookingRequest, CheckoutReceipt, CheckoutService, ExtensionRequest, PaymentSelection,
};
pub use currency::CurrencyService;
pub use payment_vault::PaymentVault;
pub use reservation_sweeper::start_reservation_sweeper;
pub use reservations::ReservationManager;
pub use slot_registry::SlotRegistry;
pub use users::UserDirectory;

use crate::application::events::SharedEventBus;
use crate::application::ports::PaymentGateway;
use crate::domain::settings::CurrencySettings;
use crate::domain::RepositoryProvider;
use crate::shared::utils::StorePolicy;

/// Every service wired over one repository provider.
#[derive(Clone)]
pub struct AppServices {
    pub repos: Arc<dyn RepositoryProvider>,
    pub events: SharedEventBus,
    pub audit: Arc<AuditLogger>,
    pub slots: Arc<SlotRegistry>,
    pub reservations: Arc<ReservationManager>,
    pub vault: Arc<PaymentVault>,
    pub currency: Arc<CurrencyService>,
    pub users: Arc<UserDirectory>,
    pub checkout: Arc<CheckoutService>,
}

impl AppServices {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        gateway: Arc<dyn PaymentGateway>,
        events: SharedEventBus,
        policy: StorePolicy,
        default_currency: CurrencySettings,
    ) -> Self {
        let audit = Arc::new(AuditLogger::new(repos.clone(), events.clone(), policy.clone()));
        let slots = Arc::new(SlotRegistry::new(repos.clone(), audit.clone(), policy.clone()));
        let reservations = Arc::new(ReservationManager::new(
            repos.clone(),
            audit.clone(),
            policy.clone(),
        ));
        let vault = Arc::new(PaymentVault::new(repos.clone(), audit.clone(), policy.clone()));
        let currency = Arc::new(CurrencyService::new(
            repos.clone(),
            audit.clone(),
            policy.clone(),
            default_currency,
        ));
        let users = Arc::new(UserDirectory::new(repos.clone(), audit.clone(), policy.clone()));
        let checkout = Arc::new(CheckoutService::new(
            repos.clone(),
            reservations.clone(),
            vault.clone(),
            currency.clone(),
            gateway,
            policy,
        ));

        Self {
            repos,
            events,
            audit,
            slots,
            reservations,
            vault,
            currency,
            users,
            checkout,
        }
    }
}
