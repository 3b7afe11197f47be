//! Ticket history entity model
//!
//! Append-only audit trail. Rows are only ever removed together with their
//! ticket.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub ticket_id: i32,

    pub changed_by_user_id: i32,

    /// Field that changed (`status`, `priority`, `assignedTo`, ...)
    pub field_name: String,

    pub change_type: ChangeType,

    #[sea_orm(column_type = "Text", nullable)]
    pub old_value: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub new_value: Option<String>,

    /// Human-readable summary shown on the ticket timeline
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_at: DateTimeUtc,
}

/// Kind of change recorded in a history entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    #[sea_orm(string_value = "created")]
    Created,

    #[sea_orm(string_value = "status_changed")]
    StatusChanged,

    #[sea_orm(string_value = "assigned")]
    Assigned,

    #[sea_orm(string_value = "priority_changed")]
    PriorityChanged,

    #[sea_orm(string_value = "category_changed")]
    CategoryChanged,

    #[sea_orm(string_value = "comment_added")]
    CommentAdded,

    #[sea_orm(string_value = "attachment_added")]
    AttachmentAdded,

    #[sea_orm(string_value = "other")]
    Other,

    /// Generic administrative overwrite
    #[sea_orm(string_value = "update")]
    Update,
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
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    pub id: i32,
    pub ticket_id: i32,
    pub changed_by_user_id: i32,
    pub field_name: String,
    pub change_type: ChangeType,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub created_at: DateTimeUtc,
}

impl From<Model> for HistoryEntryResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            ticket_id: model.ticket_id,
            changed_by_user_id: model.changed_by_user_id,
            field_name: model.field_name,
            change_type: model.change_type,
            old_value: model.old_value,
            new_value: model.new_value,
            description: model.description,
            created_at: model.created_at,
        }
    }
}
