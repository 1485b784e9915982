//! Session module: the signed-in caller

pub mod handlers;

pub use handlers::*;
