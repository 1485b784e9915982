//! Audit log aggregate

pub mod model;
pub mod repository;

pub use model::{is_visible_to, ActionType, LogFilter, SystemLog};
pub use repository::AuditLogRepository;
