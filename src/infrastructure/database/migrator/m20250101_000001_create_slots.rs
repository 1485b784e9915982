//! Create slots table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Slots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Slots::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Slots::Name).string().not_null())
                    .col(ColumnDef::new(Slots::Lat).double().not_null())
                    .col(ColumnDef::new(Slots::Lon).double().not_null())
                    .col(ColumnDef::new(Slots::Address).string().not_null())
                    .col(
                        ColumnDef::new(Slots::Status)
                            .string()
                            .not_null()
                            .default("Available"),
                    )
                    .col(ColumnDef::new(Slots::VehicleType).string().not_null())
                    .col(ColumnDef::new(Slots::PricePerHour).string().not_null())
                    .col(
                        ColumnDef::new(Slots::Features)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Slots::OperatingHours).string().not_null())
                    .col(ColumnDef::new(Slots::Rating).string())
                    .col(ColumnDef::new(Slots::ReviewCount).integer())
                    .col(
                        ColumnDef::new(Slots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Slots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_slots_status")
                    .table(Slots::Table)
                    .col(Slots::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Slots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Slots {
    Table,
    Id,
    Name,
    Lat,
    Lon,
    Address,
    Status,
    VehicleType,
    PricePerHour,
    Features,
    OperatingHours,
    Rating,
    ReviewCount,
    CreatedAt,
    UpdatedAt,
}
