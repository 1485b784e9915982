//! Display currency settings

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use super::AuditLogger;
use crate::domain::audit::ActionType;
use crate::domain::settings::CurrencySettings;
use crate::domain::user::{require_user, CurrentUser};
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::utils::{with_deadline, StorePolicy};

pub struct CurrencyService {
    repos: Arc<dyn RepositoryProvider>,
    audit: Arc<AuditLogger>,
    policy: StorePolicy,
    default: CurrencySettings,
}

impl CurrencyService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        audit: Arc<AuditLogger>,
        policy: StorePolicy,
        default: CurrencySettings,
    ) -> Self {
        Self {
            repos,
            audit,
            policy,
            default,
        }
    }

    /// Stored settings, or the configured default.
    pub async fn get(&self) -> DomainResult<CurrencySettings> {
        Ok(self
            .repos
            .settings()
            .get_currency()
            .await?
            .unwrap_or_else(|| self.default.clone()))
    }

    pub async fn set(
        &self,
        actor: Option<&CurrentUser>,
        code: &str,
        symbol: &str,
    ) -> DomainResult<CurrencySettings> {
        let actor = require_user(actor)?;
        actor.require_super_admin()?;

        let previous = self.get().await?;
        let settings = CurrencySettings::new(code, symbol, Some(actor.id))?;
        with_deadline(
            self.policy.write_timeout,
            "set_currency",
            self.repos.settings().set_currency(settings.clone()),
        )
        .await?;

        info!(code = %settings.code, symbol = %settings.symbol, "Currency updated");
        self.audit
            .log_action(
                actor,
                ActionType::CurrencyUpdated,
                format!("Currency changed from {} to {}", previous.code, settings.code),
                json!({ "from": previous.code, "to": settings.code, "symbol": settings.symbol }),
            )
            .await;
        Ok(settings)
    }

    pub async fn format(&self, amount: Decimal) -> DomainResult<String> {
        Ok(self.get().await?.format(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{fixture, user};
    use crate::domain::user::UserRole;
    use crate::domain::DomainError;

    #[tokio::test]
    async fn falls_back_to_configured_default() {
        let fx = fixture();
        let settings = fx.services.currency.get().await.unwrap();
        assert_eq!(settings.code, "BDT");
        assert_eq!(
            fx.services.currency.format(Decimal::new(12345, 1)).await.unwrap(),
            "৳1234.50"
        );
    }

    #[tokio::test]
    async fn super_admin_changes_currency() {
        let fx = fixture();
        let root = user(UserRole::SuperAdmin);

        let saved = fx.services.currency.set(Some(&root), "USD", "$").await.unwrap();
        assert_eq!(saved.updated_by, Some(root.id));
        assert_eq!(fx.services.currency.get().await.unwrap().code, "USD");
        assert_eq!(
            fx.services.currency.format(Decimal::from(5)).await.unwrap(),
            "$5.00"
        );
    }

    #[tokio::test]
    async fn rejects_bad_values_and_non_super_admins() {
        let fx = fixture();
        let root = user(UserRole::SuperAdmin);

        match fx.services.currency.set(Some(&root), "us", "").await {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.has("code"));
                assert!(errors.has("symbol"));
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
        assert!(matches!(
            fx.services
                .currency
                .set(Some(&user(UserRole::Admin)), "USD", "$")
                .await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(fx.services.currency.get().await.unwrap().code, "BDT");
    }
}
