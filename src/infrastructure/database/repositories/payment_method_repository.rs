//! SeaORM implementation of PaymentMethodRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;
use uuid::Uuid;

use super::convert::{db_err, is_unique_violation, parse_json, parse_uuid, to_json};
use crate::domain::payment_method::{PaymentMethodRepository, SavedPaymentMethod};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::payment_method;

pub struct SeaOrmPaymentMethodRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentMethodRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: payment_method::Model) -> DomainResult<SavedPaymentMethod> {
    Ok(SavedPaymentMethod {
        id: parse_uuid("payment_methods.id", &m.id)?,
        user_id: parse_uuid("payment_methods.user_id", &m.user_id)?,
        instrument: parse_json("payment_methods.instrument", &m.instrument)?,
        created_at: m.created_at,
    })
}

#[async_trait]
impl PaymentMethodRepository for SeaOrmPaymentMethodRepository {
    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<SavedPaymentMethod>> {
        payment_method::Entity::find()
            .filter(payment_method::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(payment_method::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> DomainResult<Option<SavedPaymentMethod>> {
        payment_method::Entity::find_by_id(id.to_string())
            .filter(payment_method::Column::UserId.eq(user_id.to_string()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn insert_if_unique(&self, method: SavedPaymentMethod) -> DomainResult<()> {
        debug!(method_id = %method.id, user_id = %method.user_id, "Saving payment method");
        let model = payment_method::ActiveModel {
            id: Set(method.id.to_string()),
            user_id: Set(method.user_id.to_string()),
            kind: Set(method.instrument.kind().to_string()),
            identity_key: Set(method.instrument.identity_key()),
            instrument: Set(to_json(&method.instrument)?),
            created_at: Set(method.created_at),
        };
        match model.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(DomainError::DuplicateMethod),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<bool> {
        let result = payment_method::Entity::delete_many()
            .filter(payment_method::Column::Id.eq(id.to_string()))
            .filter(payment_method::Column::UserId.eq(user_id.to_string()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}
