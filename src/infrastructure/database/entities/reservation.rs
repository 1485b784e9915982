//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,
    pub slot_id: String,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    /// Decimal string
    pub total_cost: String,

    /// Active, Completed, Cancelled
    pub status: String,

    #[sea_orm(nullable)]
    pub payment_method: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    /// Incremented on every write
    pub version: i64,
}

// No foreign key on slot_id: a slot may be deleted while old
// reservations still reference it.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::slot::Entity",
        from = "Column::SlotId",
        to = "super::slot::Column::Id"
    )]
    Slot,
}

impl Related<super::slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
