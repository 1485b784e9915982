//! Audit logger
//!
//! Appends immutable log entries and fans them out as transient
//! notifications. Logging a user action never fails the action itself.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::application::events::{Notification, SharedEventBus};
use crate::domain::audit::{ActionType, LogFilter, SystemLog};
use crate::domain::user::{require_user, CurrentUser, UserRole};
use crate::domain::{DomainResult, RepositoryProvider};
use crate::shared::types::{PaginatedResult, PaginationParams};
use crate::shared::utils::{read_or_empty, with_deadline, StorePolicy};

pub struct AuditLogger {
    repos: Arc<dyn RepositoryProvider>,
    events: SharedEventBus,
    policy: StorePolicy,
}

impl AuditLogger {
    pub fn new(repos: Arc<dyn RepositoryProvider>, events: SharedEventBus, policy: StorePolicy) -> Self {
        Self {
            repos,
            events,
            policy,
        }
    }

    /// Append an entry and publish it to notification subscribers.
    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        actor_role: Option<UserRole>,
        action_type: ActionType,
        details: impl Into<String>,
        metadata: serde_json::Value,
    ) -> DomainResult<SystemLog> {
        let log = SystemLog::new(actor_id, actor_role, action_type, details, metadata);
        with_deadline(
            self.policy.write_timeout,
            "append_log",
            self.repos.audit_logs().append(log.clone()),
        )
        .await?;

        metrics::counter!("audit_logs_recorded_total", "action" => action_type.as_str())
            .increment(1);

        // Every entry is published; each subscriber filters with
        // `Notification::is_for`.
        self.events.publish(Notification::from_log(&log));
        Ok(log)
    }

    /// Best-effort [`record`](Self::record) on behalf of a session user.
    pub async fn log_action(
        &self,
        actor: &CurrentUser,
        action_type: ActionType,
        details: impl Into<String>,
        metadata: serde_json::Value,
    ) {
        if let Err(e) = self
            .record(Some(actor.id), Some(actor.role), action_type, details, metadata)
            .await
        {
            warn!(
                actor_id = %actor.id,
                action = %action_type,
                error = %e,
                "Failed to write audit log"
            );
        }
    }

    /// Best-effort entry for actions taken by the service itself.
    pub async fn log_system(
        &self,
        action_type: ActionType,
        details: impl Into<String>,
        metadata: serde_json::Value,
    ) {
        if let Err(e) = self.record(None, None, action_type, details, metadata).await {
            warn!(action = %action_type, error = %e, "Failed to write audit log");
        }
    }

    /// Filtered, newest-first page of logs. Super-admin only.
    pub async fn list(
        &self,
        actor: Option<&CurrentUser>,
        filter: LogFilter,
        page: PaginationParams,
    ) -> DomainResult<PaginatedResult<SystemLog>> {
        require_user(actor)?.require_super_admin()?;

        let logs = read_or_empty(
            &self.policy.bulk,
            || self.repos.audit_logs().find(&filter),
            "list_logs",
        )
        .await;
        Ok(PaginatedResult::from_vec(logs, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "x@example.com".into(),
            name: "X".into(),
            role,
        }
    }

    fn logger() -> AuditLogger {
        AuditLogger::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            create_event_bus(),
            StorePolicy::default(),
        )
    }

    #[tokio::test]
    async fn record_appends_and_publishes() {
        let audit = logger();
        let mut sub = audit.events.subscribe();
        let admin = user(UserRole::Admin);

        audit
            .log_action(&admin, ActionType::SlotCreated, "Created slot A1", serde_json::json!({"slot": "A1"}))
            .await;

        let note = sub.recv().await.unwrap();
        assert_eq!(note.action_type, ActionType::SlotCreated);
        assert!(note.is_for(&admin));

        let root = user(UserRole::SuperAdmin);
        let page = audit
            .list(Some(&root), LogFilter::default(), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].metadata["slot"], "A1");
    }

    #[tokio::test]
    async fn list_is_super_admin_only() {
        let audit = logger();
        let admin = user(UserRole::Admin);
        assert!(audit
            .list(Some(&admin), LogFilter::default(), PaginationParams::default())
            .await
            .is_err());
        assert!(audit
            .list(None, LogFilter::default(), PaginationParams::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let audit = logger();
        let u = user(UserRole::User);
        audit.log_action(&u, ActionType::Login, "first", serde_json::Value::Null).await;
        audit.log_action(&u, ActionType::ReservationCreated, "second", serde_json::Value::Null).await;
        audit.log_action(&u, ActionType::Login, "third", serde_json::Value::Null).await;

        let root = user(UserRole::SuperAdmin);
        let logins = audit
            .list(
                Some(&root),
                LogFilter {
                    action_type: Some(ActionType::Login),
                    ..LogFilter::default()
                },
                PaginationParams::default(),
            )
            .await
            .unwrap();
        let details: Vec<_> = logins.items.iter().map(|l| l.details.as_str()).collect();
        assert_eq!(details, vec!["third", "first"]);
    }

    #[tokio::test]
    async fn user_entries_reach_the_actor_but_not_other_users() {
        let audit = logger();
        let mut sub = audit.events.subscribe();
        let driver = user(UserRole::User);

        audit
            .log_action(&driver, ActionType::SlotDeleted, "odd but allowed", serde_json::Value::Null)
            .await;
        audit
            .log_action(&driver, ActionType::ReservationEnded, "Ended", serde_json::Value::Null)
            .await;

        let slot_note = sub.recv().await.unwrap();
        assert!(!slot_note.is_for(&driver));
        assert!(slot_note.is_for(&user(UserRole::Admin)));

        let ended = sub.recv().await.unwrap();
        assert!(ended.is_for(&driver));
        assert!(!ended.is_for(&user(UserRole::User)));
        assert!(ended.is_for(&user(UserRole::SuperAdmin)));
    }
}
