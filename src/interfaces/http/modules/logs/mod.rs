//! Audit log module (super-admin)

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
