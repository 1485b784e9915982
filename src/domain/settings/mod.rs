//! Service-wide settings managed by super-admins

pub mod model;
pub mod repository;

pub use model::CurrencySettings;
pub use repository::SettingsRepository;
