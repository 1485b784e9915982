//! Settlement ledger
//!
//! One row per checkout charge, keyed by the client's idempotency key.

pub mod model;
pub mod repository;

pub use model::{Settlement, SettlementKind, SettlementStatus};
pub use repository::SettlementRepository;
