//! SeaORM implementation of AuditLogRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use super::convert::{corrupt, db_err, parse_json, parse_uuid, to_json};
use crate::domain::audit::{ActionType, AuditLogRepository, LogFilter, SystemLog};
use crate::domain::user::UserRole;
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::system_log;

pub struct SeaOrmAuditLogRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuditLogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: system_log::Model) -> DomainResult<SystemLog> {
    Ok(SystemLog {
        id: parse_uuid("system_logs.id", &m.id)?,
        timestamp: m.timestamp,
        actor_id: m
            .actor_id
            .as_deref()
            .map(|id| parse_uuid("system_logs.actor_id", id))
            .transpose()?,
        actor_role: m
            .actor_role
            .as_deref()
            .map(|r| UserRole::from_str(r).ok_or_else(|| corrupt("system_logs.actor_role", r)))
            .transpose()?,
        action_type: ActionType::from_str(&m.action_type)
            .ok_or_else(|| corrupt("system_logs.action_type", &m.action_type))?,
        details: m.details,
        metadata: parse_json("system_logs.metadata", &m.metadata)?,
    })
}

#[async_trait]
impl AuditLogRepository for SeaOrmAuditLogRepository {
    async fn append(&self, log: SystemLog) -> DomainResult<()> {
        let model = system_log::ActiveModel {
            seq: NotSet,
            id: Set(log.id.to_string()),
            timestamp: Set(log.timestamp),
            actor_id: Set(log.actor_id.map(|id| id.to_string())),
            actor_role: Set(log.actor_role.map(|r| r.as_str().to_string())),
            action_type: Set(log.action_type.as_str().to_string()),
            details: Set(log.details),
            metadata: Set(to_json(&log.metadata)?),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find(&self, filter: &LogFilter) -> DomainResult<Vec<SystemLog>> {
        let mut query = system_log::Entity::find();
        if let Some(actor_id) = filter.actor_id {
            query = query.filter(system_log::Column::ActorId.eq(actor_id.to_string()));
        }
        if let Some(role) = filter.actor_role {
            query = query.filter(system_log::Column::ActorRole.eq(role.as_str()));
        }
        if let Some(action) = filter.action_type {
            query = query.filter(system_log::Column::ActionType.eq(action.as_str()));
        }

        query
            .order_by_desc(system_log::Column::Seq)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}

