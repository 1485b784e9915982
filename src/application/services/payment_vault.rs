//! Payment method vault: a user's saved cards and wallets

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::AuditLogger;
use crate::domain::audit::ActionType;
use crate::domain::payment_method::{PaymentInput, PaymentInstrument, SavedPaymentMethod};
use crate::domain::user::{require_user, CurrentUser};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::utils::{with_deadline, StorePolicy};

pub struct PaymentVault {
    repos: Arc<dyn RepositoryProvider>,
    audit: Arc<AuditLogger>,
    policy: StorePolicy,
}

impl PaymentVault {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        audit: Arc<AuditLogger>,
        policy: StorePolicy,
    ) -> Self {
        Self {
            repos,
            audit,
            policy,
        }
    }

    pub async fn list(&self, user_id: Uuid) -> DomainResult<Vec<SavedPaymentMethod>> {
        self.repos.payment_methods().find_by_user(user_id).await
    }

    pub async fn find(&self, user_id: Uuid, id: Uuid) -> DomainResult<SavedPaymentMethod> {
        self.repos
            .payment_methods()
            .find_by_id(user_id, id)
            .await?
            .ok_or(DomainError::PaymentMethodNotFound(id))
    }

    /// Whether an equivalent instrument is already saved for the user.
    pub async fn contains(&self, user_id: Uuid, instrument: &PaymentInstrument) -> DomainResult<bool> {
        let saved = self.list(user_id).await?;
        Ok(saved.iter().any(|m| m.is_same_method(instrument)))
    }

    /// Save an already-validated instrument. `DuplicateMethod` if the user
    /// has an equivalent one.
    pub async fn add(
        &self,
        actor: Option<&CurrentUser>,
        instrument: PaymentInstrument,
    ) -> DomainResult<SavedPaymentMethod> {
        let actor = require_user(actor)?;
        let method = SavedPaymentMethod::new(actor.id, instrument);
        with_deadline(
            self.policy.write_timeout,
            "add_payment_method",
            self.repos.payment_methods().insert_if_unique(method.clone()),
        )
        .await?;

        info!(user_id = %actor.id, method_id = %method.id, kind = method.instrument.kind(), "Payment method saved");
        self.audit
            .log_action(
                actor,
                ActionType::PaymentMethodAdded,
                format!("Saved {}", method.instrument.label()),
                json!({ "method_id": method.id, "kind": method.instrument.kind() }),
            )
            .await;
        Ok(method)
    }

    /// Validate raw input and save it.
    pub async fn add_input(
        &self,
        actor: Option<&CurrentUser>,
        input: &PaymentInput,
    ) -> DomainResult<SavedPaymentMethod> {
        require_user(actor)?;
        let instrument = input.validate(Utc::now().date_naive())?;
        self.add(actor, instrument).await
    }

    /// Idempotent delete scoped to the caller's own methods.
    pub async fn remove(&self, actor: Option<&CurrentUser>, id: Uuid) -> DomainResult<()> {
        let actor = require_user(actor)?;
        let removed = with_deadline(
            self.policy.write_timeout,
            "remove_payment_method",
            self.repos.payment_methods().delete(actor.id, id),
        )
        .await?;

        if removed {
            info!(user_id = %actor.id, method_id = %id, "Payment method removed");
            self.audit
                .log_action(
                    actor,
                    ActionType::PaymentMethodRemoved,
                    "Removed a saved payment method".to_string(),
                    json!({ "method_id": id }),
                )
                .await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{card, fixture, user, wallet};
    use crate::domain::user::UserRole;

    #[tokio::test]
    async fn saved_methods_keep_display_fields_only() {
        let fx = fixture();
        let driver = user(UserRole::User);

        let saved = fx
            .services
            .vault
            .add_input(Some(&driver), &card("4242", "Rahim Uddin"))
            .await
            .unwrap();
        match &saved.instrument {
            PaymentInstrument::Card {
                last4,
                cardholder_name,
                ..
            } => {
                assert_eq!(last4, "4242");
                assert_eq!(cardholder_name, "Rahim Uddin");
            }
            other => panic!("expected a card, got {:?}", other),
        }

        fx.services
            .vault
            .add_input(Some(&driver), &wallet("017-1234-5678"))
            .await
            .unwrap();
        let listed = fx.services.vault.list(driver.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(fx
            .services
            .vault
            .contains(
                driver.id,
                &PaymentInstrument::MobileWallet {
                    provider: crate::domain::payment_method::WalletProvider::BKash,
                    account_number: "01712345678".into(),
                }
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn same_card_under_other_casing_is_a_duplicate() {
        let fx = fixture();
        let driver = user(UserRole::User);
        fx.services
            .vault
            .add_input(Some(&driver), &card("4242", "Rahim Uddin"))
            .await
            .unwrap();

        let again = fx
            .services
            .vault
            .add_input(Some(&driver), &card("4242", "  RAHIM UDDIN "))
            .await;
        assert!(matches!(again, Err(DomainError::DuplicateMethod)));

        // Another user may save the same card.
        fx.services
            .vault
            .add_input(Some(&user(UserRole::User)), &card("4242", "Rahim Uddin"))
            .await
            .unwrap();
        assert_eq!(fx.services.vault.list(driver.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_reports_every_field() {
        let fx = fixture();
        let driver = user(UserRole::User);
        let input = PaymentInput::Card(crate::domain::payment_method::CardInput {
            card_number: "4242".into(),
            expiry_date: "13/99".into(),
            cvc: "12".into(),
            cardholder_name: "R".into(),
        });

        match fx.services.vault.add_input(Some(&driver), &input).await {
            Err(DomainError::Validation(errors)) => {
                for field in ["card_number", "expiry_date", "cvc", "cardholder_name"] {
                    assert!(errors.has(field), "missing error for {}", field);
                }
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
        assert!(matches!(
            fx.services.vault.add_input(Some(&driver), &wallet("0121234567")).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            fx.services.vault.add_input(None, &wallet("01712345678")).await,
            Err(DomainError::UserNotAuthenticated)
        ));
        assert!(fx.services.vault.list(driver.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_is_idempotent_and_scoped_to_owner() {
        let fx = fixture();
        let driver = user(UserRole::User);
        let stranger = user(UserRole::User);
        let saved = fx
            .services
            .vault
            .add_input(Some(&driver), &wallet("01812345678"))
            .await
            .unwrap();

        assert!(matches!(
            fx.services.vault.find(stranger.id, saved.id).await,
            Err(DomainError::PaymentMethodNotFound(_))
        ));
        fx.services.vault.remove(Some(&stranger), saved.id).await.unwrap();
        assert_eq!(fx.services.vault.find(driver.id, saved.id).await.unwrap(), saved);

        fx.services.vault.remove(Some(&driver), saved.id).await.unwrap();
        fx.services.vault.remove(Some(&driver), saved.id).await.unwrap();
        assert!(fx.services.vault.list(driver.id).await.unwrap().is_empty());
    }
}
