use async_trait::async_trait;
use uuid::Uuid;

use super::{UserProfile, UserRole};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the profile, or refresh email, name and last-seen time of an
    /// existing row. The stored role and `created_at` are preserved.
    async fn upsert(&self, profile: UserProfile) -> DomainResult<UserProfile>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<UserProfile>>;

    /// All profiles, oldest first.
    async fn find_all(&self) -> DomainResult<Vec<UserProfile>>;

    /// Returns the updated profile, or `None` when the user is unknown.
    async fn set_role(&self, id: Uuid, role: UserRole) -> DomainResult<Option<UserProfile>>;
}
