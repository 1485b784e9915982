//! Audit log entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_logs")]
pub struct Model {
    /// Insertion order; newest-first reads sort on it
    #[sea_orm(primary_key)]
    pub seq: i64,

    #[sea_orm(unique)]
    pub id: String,

    pub timestamp: DateTimeUtc,

    #[sea_orm(nullable)]
    pub actor_id: Option<String>,

    #[sea_orm(nullable)]
    pub actor_role: Option<String>,

    pub action_type: String,
    pub details: String,

    /// JSON object
    pub metadata: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
