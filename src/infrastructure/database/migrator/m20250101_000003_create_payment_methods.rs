//! Create payment_methods table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentMethods::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentMethods::UserId).string().not_null())
                    .col(ColumnDef::new(PaymentMethods::Kind).string().not_null())
                    .col(
                        ColumnDef::new(PaymentMethods::IdentityKey)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentMethods::Instrument).text().not_null())
                    .col(
                        ColumnDef::new(PaymentMethods::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per user and instrument identity
        manager
            .create_index(
                Index::create()
                    .name("idx_payment_methods_user_identity")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::UserId)
                    .col(PaymentMethods::IdentityKey)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PaymentMethods {
    Table,
    Id,
    UserId,
    Kind,
    IdentityKey,
    Instrument,
    CreatedAt,
}
