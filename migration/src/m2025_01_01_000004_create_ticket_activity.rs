//! Migration to create the ticket comments and ticket history tables.
//!
//! Both tables cascade on ticket deletion. History is append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketComments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketComments::TicketId).integer().not_null())
                    .col(ColumnDef::new(TicketComments::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(TicketComments::Content)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(TicketComments::AttachmentUrl).text().null())
                    .col(
                        ColumnDef::new(TicketComments::AttachmentName)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TicketComments::IsInternal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TicketComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TicketComments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_comments_ticket_id")
                            .from(TicketComments::Table, TicketComments::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_comments_user_id")
                            .from(TicketComments::Table, TicketComments::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_comments_ticket_id")
                    .table(TicketComments::Table)
                    .col(TicketComments::TicketId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketHistory::TicketId).integer().not_null())
                    .col(
                        ColumnDef::new(TicketHistory::ChangedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TicketHistory::FieldName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TicketHistory::ChangeType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TicketHistory::OldValue).text().null())
                    .col(ColumnDef::new(TicketHistory::NewValue).text().null())
                    .col(ColumnDef::new(TicketHistory::Description).text().null())
                    .col(
                        ColumnDef::new(TicketHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_history_ticket_id")
                            .from(TicketHistory::Table, TicketHistory::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_history_ticket_id")
                    .table(TicketHistory::Table)
                    .col(TicketHistory::TicketId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_ticket_history_ticket_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TicketHistory::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_ticket_comments_ticket_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TicketComments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TicketComments {
    Table,
    Id,
    TicketId,
    UserId,
    Content,
    AttachmentUrl,
    AttachmentName,
    IsInternal,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TicketHistory {
    Table,
    Id,
    TicketId,
    ChangedByUserId,
    FieldName,
    ChangeType,
    OldValue,
    NewValue,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
