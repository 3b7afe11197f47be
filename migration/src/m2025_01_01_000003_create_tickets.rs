//! Migration to create the tickets table.
//!
//! Tickets are the aggregate root of the system. `folio` and `ticket_number`
//! carry unique indexes so a duplicate allocation surfaces as a conflict.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tickets::Branch)
                            .string_len(8)
                            .not_null()
                            .default("SRV"),
                    )
                    .col(ColumnDef::new(Tickets::Folio).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Tickets::TicketNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Tickets::Description).text().not_null())
                    .col(ColumnDef::new(Tickets::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Tickets::StatusId).integer().not_null())
                    .col(ColumnDef::new(Tickets::PriorityId).integer().not_null())
                    .col(ColumnDef::new(Tickets::DepartmentId).integer().not_null())
                    .col(
                        ColumnDef::new(Tickets::CreatedByUserId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::AssignedToUserId).integer().null())
                    .col(ColumnDef::new(Tickets::UserName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Tickets::UserEmail)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::TechnicalReport).text().null())
                    .col(ColumnDef::new(Tickets::ResolutionNotes).text().null())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tickets::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_category_id")
                            .from(Tickets::Table, Tickets::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_status_id")
                            .from(Tickets::Table, Tickets::StatusId)
                            .to(TicketStatuses::Table, TicketStatuses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_priority_id")
                            .from(Tickets::Table, Tickets::PriorityId)
                            .to(Priorities::Table, Priorities::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_department_id")
                            .from(Tickets::Table, Tickets::DepartmentId)
                            .to(Departments::Table, Departments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_created_by_user_id")
                            .from(Tickets::Table, Tickets::CreatedByUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_assigned_to_user_id")
                            .from(Tickets::Table, Tickets::AssignedToUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_folio")
                    .table(Tickets::Table)
                    .col(Tickets::Folio)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_ticket_number")
                    .table(Tickets::Table)
                    .col(Tickets::TicketNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Creator lookups back "my tickets" and access checks
        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_created_by_user_id")
                    .table(Tickets::Table)
                    .col(Tickets::CreatedByUserId)
                    .to_owned(),
            )
            .await?;

        // Monthly reports scan by creation time
        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_created_at")
                    .table(Tickets::Table)
                    .col(Tickets::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_tickets_folio",
            "idx_tickets_ticket_number",
            "idx_tickets_created_by_user_id",
            "idx_tickets_created_at",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    Branch,
    Folio,
    TicketNumber,
    Title,
    Description,
    CategoryId,
    StatusId,
    PriorityId,
    DepartmentId,
    CreatedByUserId,
    AssignedToUserId,
    UserName,
    UserEmail,
    TechnicalReport,
    ResolutionNotes,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum TicketStatuses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Priorities {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
