//! # Park-Eazy
//!
//! Parking reservation service: slot search, time-bounded reservations
//! with exact pricing, a saved payment method vault, idempotent checkout
//! and an audit log with live notifications.
//!
//! ## Architecture
//!
//! - **domain**: entities, value types and repository ports
//! - **application**: use-case services, notification bus, payment port
//! - **infrastructure**: SeaORM and in-memory stores, JWT, payment gateway
//! - **interfaces**: REST API with Swagger docs and the notification WebSocket
//! - **shared**: errors, pagination, retry and shutdown helpers

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use application::{create_event_bus, AppServices, EventBus, Notification, SharedEventBus};
pub use infrastructure::{
    init_database, open_repositories, DatabaseConfig, InMemoryRepositoryProvider,
    SeaOrmRepositoryProvider, SimulatedGateway,
};
pub use interfaces::http::{create_api_router, AppState};
