//! SeaORM implementation of ReservationRepository
//!
//! Writes that touch a slot and a reservation together run in one
//! database transaction, with the slot claim done as a conditional update
//! so two bookings can never both see the slot as Available.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::convert::{corrupt, db_err, parse_decimal, parse_uuid};
use crate::domain::reservation::{Reservation, ReservationRepository, ReservationStatus};
use crate::domain::slot::SlotStatus;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{reservation, slot};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    Ok(Reservation {
        id: parse_uuid("reservations.id", &m.id)?,
        user_id: parse_uuid("reservations.user_id", &m.user_id)?,
        slot_id: parse_uuid("reservations.slot_id", &m.slot_id)?,
        start_time: m.start_time,
        end_time: m.end_time,
        total_cost: parse_decimal("reservations.total_cost", &m.total_cost)?,
        status: ReservationStatus::from_str(&m.status)
            .ok_or_else(|| corrupt("reservations.status", &m.status))?,
        payment_method: m.payment_method,
        created_at: m.created_at,
        updated_at: m.updated_at,
        version: m.version,
    })
}

fn models_to_domain(models: Vec<reservation::Model>) -> DomainResult<Vec<Reservation>> {
    models.into_iter().map(model_to_domain).collect()
}

fn domain_to_active(r: &Reservation) -> reservation::ActiveModel {
    reservation::ActiveModel {
        id: Set(r.id.to_string()),
        user_id: Set(r.user_id.to_string()),
        slot_id: Set(r.slot_id.to_string()),
        start_time: Set(r.start_time),
        end_time: Set(r.end_time),
        total_cost: Set(r.total_cost.to_string()),
        status: Set(r.status.as_str().to_string()),
        payment_method: Set(r.payment_method.clone()),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
        version: Set(r.version),
    }
}

/// Overwrite the mutable columns of `r`, but only while the row is still
/// Active and at the version `r` was derived from.
async fn update_if_active<C: ConnectionTrait>(conn: &C, r: &Reservation) -> DomainResult<()> {
    let result = reservation::Entity::update_many()
        .col_expr(reservation::Column::EndTime, Expr::value(r.end_time))
        .col_expr(
            reservation::Column::TotalCost,
            Expr::value(r.total_cost.to_string()),
        )
        .col_expr(reservation::Column::Status, Expr::value(r.status.as_str()))
        .col_expr(
            reservation::Column::PaymentMethod,
            Expr::value(r.payment_method.clone()),
        )
        .col_expr(reservation::Column::UpdatedAt, Expr::value(r.updated_at))
        .col_expr(reservation::Column::Version, Expr::value(r.version))
        .filter(reservation::Column::Id.eq(r.id.to_string()))
        .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
        .filter(reservation::Column::Version.eq(r.base_version()))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if result.rows_affected > 0 {
        return Ok(());
    }
    let stored = reservation::Entity::find_by_id(r.id.to_string())
        .one(conn)
        .await
        .map_err(db_err)?;
    Err(match stored {
        None => DomainError::ReservationNotFound(r.id),
        Some(m) if m.status != ReservationStatus::Active.as_str() => {
            DomainError::ReservationNotActive(r.id)
        }
        Some(_) => DomainError::ReservationChanged(r.id),
    })
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn create_with_slot_claim(&self, r: Reservation) -> DomainResult<()> {
        debug!(reservation_id = %r.id, slot_id = %r.slot_id, "Claiming slot for reservation");
        let txn = self.db.begin().await.map_err(db_err)?;

        let claimed = slot::Entity::update_many()
            .col_expr(slot::Column::Status, Expr::value(SlotStatus::Reserved.as_str()))
            .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(slot::Column::Id.eq(r.slot_id.to_string()))
            .filter(slot::Column::Status.eq(SlotStatus::Available.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if claimed.rows_affected == 0 {
            let exists = slot::Entity::find_by_id(r.slot_id.to_string())
                .one(&txn)
                .await
                .map_err(db_err)?
                .is_some();
            txn.rollback().await.map_err(db_err)?;
            return Err(if exists {
                DomainError::SlotUnavailable(r.slot_id)
            } else {
                DomainError::SlotNotFound(r.slot_id)
            });
        }

        domain_to_active(&r).insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .order_by_desc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_active_for_slot(&self, slot_id: Uuid) -> DomainResult<Option<Reservation>> {
        reservation::Entity::find()
            .filter(reservation::Column::SlotId.eq(slot_id.to_string()))
            .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn update_active(&self, r: Reservation) -> DomainResult<()> {
        debug!(reservation_id = %r.id, "Updating reservation");
        update_if_active(&self.db, &r).await
    }

    async fn complete_and_release_slot(&self, r: Reservation) -> DomainResult<()> {
        debug!(reservation_id = %r.id, slot_id = %r.slot_id, "Completing reservation");
        let txn = self.db.begin().await.map_err(db_err)?;

        if let Err(e) = update_if_active(&txn, &r).await {
            txn.rollback().await.map_err(db_err)?;
            return Err(e);
        }

        // A deleted slot matches no row; the reservation still completes.
        slot::Entity::update_many()
            .col_expr(slot::Column::Status, Expr::value(SlotStatus::Available.as_str()))
            .col_expr(slot::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(slot::Column::Id.eq(r.slot_id.to_string()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .filter(reservation::Column::EndTime.lt(now))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}
