use async_trait::async_trait;

use super::model::CurrencySettings;
use crate::domain::DomainResult;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// `None` until a super-admin has set a currency
    async fn get_currency(&self) -> DomainResult<Option<CurrencySettings>>;

    async fn set_currency(&self, settings: CurrencySettings) -> DomainResult<()>;
}
