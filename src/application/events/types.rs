//! Notification payloads pushed to WebSocket clients

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::audit::{is_visible_to, ActionType, SystemLog};
use crate::domain::user::{CurrentUser, UserRole};

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub log_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<UserRole>,
    pub action_type: ActionType,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn from_log(log: &SystemLog) -> Self {
        Self {
            log_id: log.id,
            actor_id: log.actor_id,
            actor_role: log.actor_role,
            action_type: log.action_type,
            details: log.details.clone(),
            timestamp: log.timestamp,
        }
    }

    /// Delivery rule for a connected viewer.
    ///
    /// Super-admins receive everything. Admins receive slot management by
    /// any actor. Users receive their own actions from the USER table.
    pub fn is_for(&self, viewer: &CurrentUser) -> bool {
        match viewer.role {
            UserRole::SuperAdmin => true,
            UserRole::Admin => is_visible_to(UserRole::Admin, self.action_type),
            UserRole::User => {
                self.actor_id == Some(viewer.id) && is_visible_to(UserRole::User, self.action_type)
            }
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.action_type.as_str()
    }
}
