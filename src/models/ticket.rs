//! Ticket entity model
//!
//! Tickets are the aggregate root. Comments, history entries and
//! notifications referencing a ticket are removed together with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Office that owns the ticket
    pub branch: Branch,

    /// Human-readable folio, e.g. `SRV - 1001` (unique)
    #[sea_orm(unique)]
    pub folio: String,

    /// Ticket number, e.g. `TKT-SRV-1001` (unique)
    #[sea_orm(unique)]
    pub ticket_number: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category_id: i32,

    pub status_id: i32,

    pub priority_id: i32,

    pub department_id: i32,

    pub created_by_user_id: i32,

    pub assigned_to_user_id: Option<i32>,

    /// Requester name as typed on the form
    pub user_name: String,

    /// Requester corporate email
    pub user_email: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub technical_report: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub resolution_notes: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    /// Set the first time the ticket enters the `resolved` status; never cleared
    pub resolved_at: Option<DateTimeUtc>,
}

/// Office branch prefix used in folios and ticket numbers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Branch {
    #[sea_orm(string_value = "SRV")]
    #[serde(rename = "SRV")]
    #[default]
    Srv,

    #[sea_orm(string_value = "NAUC")]
    #[serde(rename = "NAUC")]
    Nauc,
}

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Srv => "SRV",
            Branch::Nauc => "NAUC",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_comment::Entity")]
    Comment,

    #[sea_orm(has_many = "super::ticket_history::Entity")]
    History,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedByUserId",
        to = "super::user::Column::Id"
    )]
    Creator,
}

impl Related<super::ticket_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::ticket_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public representation of a ticket for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: i32,
    pub branch: Branch,
    pub folio: String,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category_id: i32,
    pub status_id: i32,
    pub priority_id: i32,
    pub department_id: i32,
    pub created_by_user_id: i32,
    pub assigned_to_user_id: Option<i32>,
    pub user_name: String,
    pub user_email: String,
    pub technical_report: Option<String>,
    pub resolution_notes: Option<String>,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub created_at: DateTimeUtc,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub updated_at: DateTimeUtc,
    #[schema(value_type = Option<String>, example = "2025-01-02T08:30:00Z")]
    pub resolved_at: Option<DateTimeUtc>,
}

impl From<Model> for TicketResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            branch: model.branch,
            folio: model.folio,
            ticket_number: model.ticket_number,
            title: model.title,
            description: model.description,
            category_id: model.category_id,
            status_id: model.status_id,
            priority_id: model.priority_id,
            department_id: model.department_id,
            created_by_user_id: model.created_by_user_id,
            assigned_to_user_id: model.assigned_to_user_id,
            user_name: model.user_name,
            user_email: model.user_email,
            technical_report: model.technical_report,
            resolution_notes: model.resolution_notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            resolved_at: model.resolved_at,
        }
    }
}
