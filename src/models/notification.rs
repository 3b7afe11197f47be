//! Notification entity model
//!
//! Notifications are rows in a per-user mailbox. Delivery beyond the database
//! is handled by clients polling the unread list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Recipient
    pub user_id: i32,

    pub ticket_id: Option<i32>,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    #[sea_orm(column_name = "type")]
    pub kind: NotificationType,

    pub is_read: bool,

    /// Client route to open when the notification is clicked
    #[sea_orm(column_type = "Text", nullable)]
    pub action_url: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "ticket_created")]
    TicketCreated,

    #[sea_orm(string_value = "ticket_assigned")]
    TicketAssigned,

    #[sea_orm(string_value = "ticket_status_changed")]
    TicketStatusChanged,

    #[sea_orm(string_value = "comment_added")]
    CommentAdded,

    #[sea_orm(string_value = "attachment_added")]
    AttachmentAdded,

    #[sea_orm(string_value = "ticket_resolved")]
    TicketResolved,

    #[sea_orm(string_value = "general")]
    General,
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
pub struct NotificationResponse {
    pub id: i32,
    pub ticket_id: Option<i32>,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub is_read: bool,
    pub action_url: Option<String>,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub created_at: DateTimeUtc,
}

impl From<Model> for NotificationResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            ticket_id: model.ticket_id,
            title: model.title,
            message: model.message,
            kind: model.kind,
            is_read: model.is_read,
            action_url: model.action_url,
            created_at: model.created_at,
        }
    }
}
