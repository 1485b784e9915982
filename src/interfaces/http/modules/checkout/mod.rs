//! Checkout module: paid bookings and extensions

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
