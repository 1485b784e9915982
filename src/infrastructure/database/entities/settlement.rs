//! Payment settlement entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub idempotency_key: String,

    pub user_id: String,

    #[sea_orm(nullable)]
    pub reservation_id: Option<String>,

    /// Booking, Extension
    pub kind: String,

    /// Decimal string
    pub amount: String,

    pub provider_reference: String,

    /// Authorized, Captured, Voided
    pub status: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
