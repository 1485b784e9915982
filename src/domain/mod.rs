//! Domain layer
//!
//! Entities, value types and repository ports for the parking service.
//! Nothing in here knows about HTTP, SQL or the async runtime beyond the
//! `async_trait` repository interfaces.

pub mod audit;
pub mod payment_method;
pub mod pricing;
pub mod repositories;
pub mod reservation;
pub mod settings;
pub mod settlement;
pub mod slot;
pub mod user;

pub use audit::{ActionType, LogFilter, SystemLog};
pub use payment_method::{PaymentInstrument, SavedPaymentMethod, WalletProvider};
pub use repositories::{DomainResult, RepositoryProvider};
pub use reservation::{Reservation, ReservationStatus};
pub use settings::CurrencySettings;
pub use settlement::{Settlement, SettlementKind, SettlementStatus};
pub use slot::{GeoPoint, Slot, SlotDraft, SlotFilter, SlotStatus, VehicleType};
pub use user::{CurrentUser, UserProfile, UserRole};

pub use crate::shared::types::{DomainError, FieldErrors};
