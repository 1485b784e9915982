use async_trait::async_trait;
use uuid::Uuid;

use super::model::SavedPaymentMethod;
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    /// Methods saved by a user, oldest first
    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<SavedPaymentMethod>>;

    /// A method by id, only if it belongs to `user_id`
    async fn find_by_id(&self, user_id: Uuid, id: Uuid)
        -> DomainResult<Option<SavedPaymentMethod>>;

    /// Insert unless an equivalent method already exists for the same user,
    /// in which case `DuplicateMethod` is returned and nothing is written.
    async fn insert_if_unique(&self, method: SavedPaymentMethod) -> DomainResult<()>;

    /// Delete a method owned by `user_id`. Returns `false` if none matched.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<bool>;
}
