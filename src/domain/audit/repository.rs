use async_trait::async_trait;

use super::model::{LogFilter, SystemLog};
use crate::domain::DomainResult;

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, log: SystemLog) -> DomainResult<()>;

    /// Matching entries, newest first
    async fn find(&self, filter: &LogFilter) -> DomainResult<Vec<SystemLog>>;
}
