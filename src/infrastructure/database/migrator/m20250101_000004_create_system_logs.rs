//! Create system_logs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SystemLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemLogs::Seq)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SystemLogs::Id)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SystemLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SystemLogs::ActorId).string())
                    .col(ColumnDef::new(SystemLogs::ActorRole).string())
                    .col(ColumnDef::new(SystemLogs::ActionType).string().not_null())
                    .col(ColumnDef::new(SystemLogs::Details).text().not_null())
                    .col(
                        ColumnDef::new(SystemLogs::Metadata)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_system_logs_actor")
                    .table(SystemLogs::Table)
                    .col(SystemLogs::ActorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_system_logs_action_type")
                    .table(SystemLogs::Table)
                    .col(SystemLogs::ActionType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SystemLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum SystemLogs {
    Table,
    Seq,
    Id,
    Timestamp,
    ActorId,
    ActorRole,
    ActionType,
    Details,
    Metadata,
}
