//! Parking slot entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "slots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub address: String,

    /// Available, Reserved, Occupied
    pub status: String,

    /// Car, Bike, SUV
    pub vehicle_type: String,

    /// Decimal string
    pub price_per_hour: String,

    /// JSON array of feature names
    pub features: String,

    pub operating_hours: String,

    #[sea_orm(nullable)]
    pub rating: Option<String>,

    #[sea_orm(nullable)]
    pub review_count: Option<i32>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
