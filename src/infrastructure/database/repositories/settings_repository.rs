//! SeaORM implementation of SettingsRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use super::convert::{db_err, parse_json, to_json};
use crate::domain::settings::{CurrencySettings, SettingsRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::setting;

const CURRENCY_KEY: &str = "currency";

pub struct SeaOrmSettingsRepository {
    db: DatabaseConnection,
}

impl SeaOrmSettingsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn get_currency(&self) -> DomainResult<Option<CurrencySettings>> {
        setting::Entity::find_by_id(CURRENCY_KEY.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(|m| parse_json("settings.value", &m.value))
            .transpose()
    }

    async fn set_currency(&self, settings: CurrencySettings) -> DomainResult<()> {
        let model = setting::ActiveModel {
            key: Set(CURRENCY_KEY.to_string()),
            value: Set(to_json(&settings)?),
            updated_at: Set(Utc::now()),
        };
        setting::Entity::insert(model)
            .on_conflict(
                OnConflict::column(setting::Column::Key)
                    .update_columns([setting::Column::Value, setting::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
