//! Migration to create the folio counter table.
//!
//! A single row (`id = 1`) holds the next folio number. Ticket creation locks
//! and advances it inside the creating transaction.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FolioCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FolioCounters::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FolioCounters::NextValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FolioCounters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FolioCounters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FolioCounters {
    Table,
    Id,
    NextValue,
    UpdatedAt,
}
