//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

mod convert;

pub mod audit_log_repository;
pub mod payment_method_repository;
pub mod repository_provider;
pub mod reservation_repository;
pub mod settings_repository;
pub mod settlement_repository;
pub mod slot_repository;
pub mod user_repository;

pub use repository_provider::SeaOrmRepositoryProvider;
