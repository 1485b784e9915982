//! Audit log DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::audit::{ActionType, LogFilter, SystemLog};
use crate::domain::user::UserRole;
use crate::shared::types::PaginationParams;
use crate::shared::validations::validate_pagination;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SystemLogDto {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<UserRole>,
    pub action_type: ActionType,
    pub details: String,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

impl From<SystemLog> for SystemLogDto {
    fn from(log: SystemLog) -> Self {
        Self {
            id: log.id,
            timestamp: log.timestamp,
            actor_id: log.actor_id,
            actor_role: log.actor_role,
            action_type: log.action_type,
            details: log.details,
            metadata: log.metadata,
        }
    }
}

/// Filters for the log listing; all optional
#[derive(Debug, Deserialize, IntoParams)]
pub struct LogQuery {
    pub actor_id: Option<Uuid>,
    /// `USER`, `ADMIN` or `SUPER_ADMIN`
    pub actor_role: Option<UserRole>,
    /// e.g. `RESERVATION_CREATED`
    pub action_type: Option<ActionType>,
    /// 1-based, default 1
    pub page: Option<u32>,
    /// 1-100, default 50
    pub limit: Option<u32>,
}

impl LogQuery {
    pub fn filter(&self) -> LogFilter {
        LogFilter {
            actor_id: self.actor_id,
            actor_role: self.actor_role,
            action_type: self.action_type,
        }
    }

    pub fn pagination(&self) -> PaginationParams {
        validate_pagination(self.page, self.limit)
    }
}
