//! User directory: profiles mirrored from the auth provider

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::AuditLogger;
use crate::domain::audit::ActionType;
use crate::domain::user::{require_user, CurrentUser, UserProfile, UserRole};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::utils::{read_or_empty, with_deadline, StorePolicy};

pub struct UserDirectory {
    repos: Arc<dyn RepositoryProvider>,
    audit: Arc<AuditLogger>,
    policy: StorePolicy,
}

impl UserDirectory {
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

    /// Session start: refresh the caller's profile and record the login.
    pub async fn touch(&self, actor: Option<&CurrentUser>) -> DomainResult<UserProfile> {
        let actor = require_user(actor)?;
        let profile = with_deadline(
            self.policy.write_timeout,
            "upsert_profile",
            self.repos
                .users()
                .upsert(UserProfile::from_session(actor, Utc::now())),
        )
        .await?;

        self.audit
            .log_action(
                actor,
                ActionType::Login,
                format!("{} signed in", actor.email),
                json!({ "email": actor.email }),
            )
            .await;
        Ok(profile)
    }

    pub async fn sign_out(&self, actor: Option<&CurrentUser>) -> DomainResult<()> {
        let actor = require_user(actor)?;
        self.audit
            .log_action(
                actor,
                ActionType::Logout,
                format!("{} signed out", actor.email),
                json!({ "email": actor.email }),
            )
            .await;
        Ok(())
    }

    /// All profiles. Super-admin only; degrades to empty on a slow store.
    pub async fn list(&self, actor: Option<&CurrentUser>) -> DomainResult<Vec<UserProfile>> {
        require_user(actor)?.require_super_admin()?;
        Ok(read_or_empty(&self.policy.bulk, || self.repos.users().find_all(), "list_users").await)
    }

    /// Change a user's stored role. Takes effect in tokens issued after the
    /// auth provider picks up the change.
    pub async fn set_role(
        &self,
        actor: Option<&CurrentUser>,
        id: Uuid,
        role: UserRole,
    ) -> DomainResult<UserProfile> {
        let actor = require_user(actor)?;
        actor.require_super_admin()?;

        let previous = self
            .repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))?
            .role;
        let profile = with_deadline(
            self.policy.write_timeout,
            "set_user_role",
            self.repos.users().set_role(id, role),
        )
        .await?
        .ok_or(DomainError::UserNotFound(id))?;

        info!(user_id = %id, from = %previous, to = %role, "User role changed");
        self.audit
            .log_action(
                actor,
                ActionType::UserRoleChanged,
                format!("{} is now {}", profile.email, role),
                json!({ "user_id": id, "from": previous, "to": role }),
            )
            .await;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{fixture, user};
    use crate::domain::audit::LogFilter;
    use crate::shared::types::PaginationParams;

    #[tokio::test]
    async fn sign_in_upserts_profile_and_logs_login() {
        let fx = fixture();
        let driver = user(UserRole::User);

        let first = fx.services.users.touch(Some(&driver)).await.unwrap();
        let second = fx.services.users.touch(Some(&driver)).await.unwrap();
        assert_eq!(first.id, driver.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.last_seen_at >= first.last_seen_at);

        let root = user(UserRole::SuperAdmin);
        let logins = fx
            .services
            .audit
            .list(
                Some(&root),
                LogFilter {
                    actor_id: Some(driver.id),
                    action_type: Some(ActionType::Login),
                    ..LogFilter::default()
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(logins.total, 2);

        assert!(matches!(
            fx.services.users.touch(None).await,
            Err(DomainError::UserNotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn stored_role_survives_the_next_sign_in() {
        let fx = fixture();
        let root = user(UserRole::SuperAdmin);
        let driver = user(UserRole::User);
        fx.services.users.touch(Some(&driver)).await.unwrap();

        let promoted = fx
            .services
            .users
            .set_role(Some(&root), driver.id, UserRole::Admin)
            .await
            .unwrap();
        assert_eq!(promoted.role, UserRole::Admin);

        // The token still says User until the auth provider refreshes it.
        let refreshed = fx.services.users.touch(Some(&driver)).await.unwrap();
        assert_eq!(refreshed.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn directory_is_super_admin_only() {
        let fx = fixture();
        let admin = user(UserRole::Admin);
        fx.services.users.touch(Some(&admin)).await.unwrap();

        assert!(matches!(
            fx.services.users.list(Some(&admin)).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            fx.services
                .users
                .set_role(Some(&admin), admin.id, UserRole::SuperAdmin)
                .await,
            Err(DomainError::Forbidden(_))
        ));

        let root = user(UserRole::SuperAdmin);
        assert_eq!(fx.services.users.list(Some(&root)).await.unwrap().len(), 1);
        assert!(matches!(
            fx.services
                .users
                .set_role(Some(&root), Uuid::new_v4(), UserRole::Admin)
                .await,
            Err(DomainError::UserNotFound(_))
        ));
    }
}
