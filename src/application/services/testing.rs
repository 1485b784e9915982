//! Fixtures shared by the service tests

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::AppServices;
use crate::application::events::create_event_bus;
use crate::domain::payment_method::{CardInput, PaymentInput, WalletInput, WalletProvider};
use crate::domain::settings::CurrencySettings;
use crate::domain::slot::{GeoPoint, Slot, SlotDraft, VehicleType};
use crate::domain::user::{CurrentUser, UserRole};
use crate::infrastructure::payment::SimulatedGateway;
use crate::infrastructure::storage::InMemoryRepositoryProvider;
use crate::shared::utils::{BulkReadPolicy, RetryConfig, StorePolicy};

/// Short timeouts and no backoff so degraded reads finish quickly.
pub fn fast_policy() -> StorePolicy {
    StorePolicy {
        write_timeout: Duration::from_secs(2),
        bulk: BulkReadPolicy {
            retry: RetryConfig {
                max_attempts: 1,
                initial_delay: Duration::from_millis(1),
                backoff_multiplier: 1.0,
                max_delay: Duration::from_millis(1),
            },
            attempt_timeout: Duration::from_secs(2),
            timeout_ceiling: Duration::from_secs(2),
        },
    }
}

pub struct Fixture {
    pub services: AppServices,
    pub gateway: Arc<SimulatedGateway>,
}

pub fn fixture() -> Fixture {
    let gateway = Arc::new(SimulatedGateway::new());
    let services = AppServices::new(
        Arc::new(InMemoryRepositoryProvider::new()),
        gateway.clone(),
        create_event_bus(),
        fast_policy(),
        CurrencySettings::default(),
    );
    Fixture { services, gateway }
}

pub fn user(role: UserRole) -> CurrentUser {
    let id = Uuid::new_v4();
    CurrentUser {
        id,
        email: format!("{}@example.com", id.simple()),
        name: "Test User".into(),
        role,
    }
}

pub fn draft(name: &str, price_per_hour: i64) -> SlotDraft {
    SlotDraft {
        name: name.into(),
        location: GeoPoint {
            lat: 23.8103,
            lon: 90.4125,
        },
        address: "House 12, Road 5, Dhanmondi".into(),
        status: None,
        vehicle_type: VehicleType::Car,
        price_per_hour: Decimal::from(price_per_hour),
        features: BTreeSet::from(["Covered".to_string(), "CCTV".to_string()]),
        operating_hours: "24/7".into(),
        rating: None,
        review_count: None,
    }
}

impl Fixture {
    pub async fn slot(&self, name: &str, price_per_hour: i64) -> Slot {
        let admin = user(UserRole::Admin);
        self.services
            .slots
            .add(Some(&admin), draft(name, price_per_hour))
            .await
            .unwrap()
    }
}

/// A card that stays valid for a few years from today.
pub fn card(last4: &str, holder: &str) -> PaymentInput {
    let expiry_year = (Utc::now().year() + 3) % 100;
    PaymentInput::Card(CardInput {
        card_number: format!("4242 4242 4242 {}", last4),
        expiry_date: format!("12/{:02}", expiry_year),
        cvc: "123".into(),
        cardholder_name: holder.into(),
    })
}

pub fn wallet(number: &str) -> PaymentInput {
    PaymentInput::MobileWallet(WalletInput {
        provider: WalletProvider::BKash,
        account_number: number.into(),
    })
}
