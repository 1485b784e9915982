//! Payment methods module: the caller's saved instruments

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
