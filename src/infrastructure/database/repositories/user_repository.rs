//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::convert::{corrupt, db_err, parse_uuid};
use crate::domain::user::{UserProfile, UserRepository, UserRole};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::user_profile;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: user_profile::Model) -> DomainResult<UserProfile> {
    Ok(UserProfile {
        id: parse_uuid("user_profiles.id", &m.id)?,
        role: UserRole::from_str(&m.role).ok_or_else(|| corrupt("user_profiles.role", &m.role))?,
        email: m.email,
        name: m.name,
        created_at: m.created_at,
        last_seen_at: m.last_seen_at,
    })
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn upsert(&self, profile: UserProfile) -> DomainResult<UserProfile> {
        let model = user_profile::ActiveModel {
            id: Set(profile.id.to_string()),
            email: Set(profile.email.clone()),
            name: Set(profile.name.clone()),
            role: Set(profile.role.as_str().to_string()),
            created_at: Set(profile.created_at),
            last_seen_at: Set(profile.last_seen_at),
        };

        // Role and created_at stay as first stored.
        user_profile::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user_profile::Column::Id)
                    .update_columns([
                        user_profile::Column::Email,
                        user_profile::Column::Name,
                        user_profile::Column::LastSeenAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        self.find_by_id(profile.id)
            .await?
            .ok_or_else(|| DomainError::Storage(format!("user {} vanished after upsert", profile.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<UserProfile>> {
        user_profile::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<UserProfile>> {
        user_profile::Entity::find()
            .order_by_asc(user_profile::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> DomainResult<Option<UserProfile>> {
        let result = user_profile::Entity::update_many()
            .col_expr(user_profile::Column::Role, Expr::value(role.as_str()))
            .filter(user_profile::Column::Id.eq(id.to_string()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
