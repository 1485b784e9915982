//! User aggregate
//!
//! Session identity supplied by the auth provider and the mirrored profile
//! table managed by super-admins.

pub mod model;
pub mod repository;

pub use model::{require_user, CurrentUser, UserProfile, UserRole};
pub use repository::UserRepository;
