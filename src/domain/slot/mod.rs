//! Slot aggregate
//!
//! Parking slots, their search filter and repository interface.

pub mod model;
pub mod repository;

pub use model::{GeoPoint, Slot, SlotDraft, SlotFilter, SlotStatus, VehicleType};
pub use repository::SlotRepository;
