//! Application layer
//!
//! Use-case services over the domain repositories, the notification bus and
//! the payment gateway port.

pub mod events;
pub mod ports;
pub mod services;

pub use events::{create_event_bus, EventBus, EventSubscriber, Notification, SharedEventBus};
pub use ports::{ChargeRequest, PaymentError, PaymentGateway};
pub use services::{
    start_reservation_sweeper, AppServices, AuditLogger, CheckoutService, CurrencyService,
    PaymentVault, ReservationManager, SlotRegistry, UserDirectory,
};
