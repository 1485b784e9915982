//! SeaORM implementation of SettlementRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::debug;

use super::convert::{corrupt, db_err, is_unique_violation, parse_decimal, parse_uuid};
use crate::domain::settlement::{
    Settlement, SettlementKind, SettlementRepository, SettlementStatus,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::settlement;

pub struct SeaOrmSettlementRepository {
    db: DatabaseConnection,
}

impl SeaOrmSettlementRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: settlement::Model) -> DomainResult<Settlement> {
    Ok(Settlement {
        id: parse_uuid("settlements.id", &m.id)?,
        user_id: parse_uuid("settlements.user_id", &m.user_id)?,
        reservation_id: m
            .reservation_id
            .as_deref()
            .map(|id| parse_uuid("settlements.reservation_id", id))
            .transpose()?,
        kind: SettlementKind::from_str(&m.kind)
            .ok_or_else(|| corrupt("settlements.kind", &m.kind))?,
        amount: parse_decimal("settlements.amount", &m.amount)?,
        status: SettlementStatus::from_str(&m.status)
            .ok_or_else(|| corrupt("settlements.status", &m.status))?,
        idempotency_key: m.idempotency_key,
        provider_reference: m.provider_reference,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(s: &Settlement) -> settlement::ActiveModel {
    settlement::ActiveModel {
        id: Set(s.id.to_string()),
        idempotency_key: Set(s.idempotency_key.clone()),
        user_id: Set(s.user_id.to_string()),
        reservation_id: Set(s.reservation_id.map(|id| id.to_string())),
        kind: Set(s.kind.as_str().to_string()),
        amount: Set(s.amount.to_string()),
        provider_reference: Set(s.provider_reference.clone()),
        status: Set(s.status.as_str().to_string()),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    }
}

#[async_trait]
impl SettlementRepository for SeaOrmSettlementRepository {
    async fn insert(&self, s: Settlement) -> DomainResult<bool> {
        debug!(settlement_id = %s.id, idempotency_key = %s.idempotency_key, "Recording settlement");
        match domain_to_active(&s).insert(&self.db).await {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_key(&self, idempotency_key: &str) -> DomainResult<Option<Settlement>> {
        settlement::Entity::find()
            .filter(settlement::Column::IdempotencyKey.eq(idempotency_key))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn update(&self, s: Settlement) -> DomainResult<()> {
        match domain_to_active(&s).update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(DomainError::Storage(format!(
                "settlement {} does not exist",
                s.id
            ))),
            Err(e) => Err(db_err(e)),
        }
    }
}
