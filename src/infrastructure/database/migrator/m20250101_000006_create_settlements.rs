//! Create settlements table
//!
//! The unique idempotency key is what stops a retried checkout from
//! charging twice.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settlements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settlements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Settlements::IdempotencyKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Settlements::UserId).string().not_null())
                    .col(ColumnDef::new(Settlements::ReservationId).string())
                    .col(ColumnDef::new(Settlements::Kind).string().not_null())
                    .col(ColumnDef::new(Settlements::Amount).string().not_null())
                    .col(
                        ColumnDef::new(Settlements::ProviderReference)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Settlements::Status).string().not_null())
                    .col(
                        ColumnDef::new(Settlements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Settlements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settlements::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Settlements {
    Table,
    Id,
    IdempotencyKey,
    UserId,
    ReservationId,
    Kind,
    Amount,
    ProviderReference,
    Status,
    CreatedAt,
    UpdatedAt,
}
