pub mod checkout;
pub mod health;
pub mod logs;
pub mod metrics;
pub mod payment_methods;
pub mod pricing;
pub mod reservations;
pub mod session;
pub mod settings;
pub mod slots;
pub mod users;
