//! Ticket comment entity model
//!
//! A comment carries text, an optional single attachment, or both. Internal
//! comments are visible to staff only.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket_comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub ticket_id: i32,

    /// Author
    pub user_id: i32,

    /// May be empty only when an attachment is present
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Public URL of the stored attachment (`/uploads/...`)
    #[sea_orm(column_type = "Text", nullable)]
    pub attachment_url: Option<String>,

    /// Original file name as uploaded
    pub attachment_name: Option<String>,

    pub is_internal: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket::Entity",
        from = "Column::TicketId",
        to = "super::ticket::Column::Id",
        on_delete = "Cascade"
    )]
    Ticket,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Author,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
