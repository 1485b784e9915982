use async_trait::async_trait;

use super::model::Settlement;
use crate::domain::DomainResult;

#[async_trait]
pub trait SettlementRepository: Send + Sync {
    /// Insert a new settlement. Returns `false` without writing when the
    /// idempotency key is already taken.
    async fn insert(&self, settlement: Settlement) -> DomainResult<bool>;

    async fn find_by_key(&self, idempotency_key: &str) -> DomainResult<Option<Settlement>>;

    async fn update(&self, settlement: Settlement) -> DomainResult<()>;
}
