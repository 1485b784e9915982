//! SeaORM implementation of SlotRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    NotSet, QueryOrder, Set,
};
use tracing::debug;
use uuid::Uuid;

use super::convert::{
    corrupt, db_err, is_unique_violation, parse_decimal, parse_json, parse_uuid, to_json,
};
use crate::domain::slot::{GeoPoint, Slot, SlotRepository, SlotStatus, VehicleType};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::slot;

pub struct SeaOrmSlotRepository {
    db: DatabaseConnection,
}

impl SeaOrmSlotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: slot::Model) -> DomainResult<Slot> {
    Ok(Slot {
        id: parse_uuid("slots.id", &m.id)?,
        status: SlotStatus::from_str(&m.status).ok_or_else(|| corrupt("slots.status", &m.status))?,
        vehicle_type: VehicleType::from_str(&m.vehicle_type)
            .ok_or_else(|| corrupt("slots.vehicle_type", &m.vehicle_type))?,
        price_per_hour: parse_decimal("slots.price_per_hour", &m.price_per_hour)?,
        features: parse_json("slots.features", &m.features)?,
        rating: m
            .rating
            .as_deref()
            .map(|r| parse_decimal("slots.rating", r))
            .transpose()?,
        review_count: m.review_count.map(|c| c.max(0) as u32),
        name: m.name,
        location: GeoPoint { lat: m.lat, lon: m.lon },
        address: m.address,
        operating_hours: m.operating_hours,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(s: &Slot) -> DomainResult<slot::ActiveModel> {
    Ok(slot::ActiveModel {
        id: Set(s.id.to_string()),
        name: Set(s.name.clone()),
        lat: Set(s.location.lat),
        lon: Set(s.location.lon),
        address: Set(s.address.clone()),
        status: Set(s.status.as_str().to_string()),
        vehicle_type: Set(s.vehicle_type.as_str().to_string()),
        price_per_hour: Set(s.price_per_hour.to_string()),
        features: Set(to_json(&s.features)?),
        operating_hours: Set(s.operating_hours.clone()),
        rating: Set(s.rating.map(|r| r.to_string())),
        review_count: Set(s.review_count.map(|c| c as i32)),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    })
}

// ── SlotRepository impl ─────────────────────────────────────────

#[async_trait]
impl SlotRepository for SeaOrmSlotRepository {
    async fn save(&self, s: Slot) -> DomainResult<()> {
        debug!(slot_id = %s.id, "Saving slot");
        domain_to_active(&s)?
            .insert(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::Storage(format!("slot {} already exists", s.id))
                } else {
                    db_err(e)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Slot>> {
        slot::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Slot>> {
        slot::Entity::find()
            .order_by_asc(slot::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn update(&self, s: Slot) -> DomainResult<()> {
        debug!(slot_id = %s.id, "Updating slot");
        let mut model = domain_to_active(&s)?;
        // Status moves only through the conditional writes.
        model.status = NotSet;
        match model.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(DomainError::SlotNotFound(s.id)),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let result = slot::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn set_status(&self, id: Uuid, status: SlotStatus) -> DomainResult<Option<Slot>> {
        let result = slot::Entity::update_many()
            .col_expr(slot::Column::Status, Expr::value(status.as_str()))
            .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(slot::Column::Id.eq(id.to_string()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
