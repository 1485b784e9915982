//! Payment gateway implementations

pub mod simulated;

pub use simulated::{SimulatedChargeState, SimulatedGateway};
