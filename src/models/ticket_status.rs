//! Ticket status entity model
//!
//! Statuses are data, not a fixed enum. Two names carry behavior: [`OPEN`] is
//! assigned on creation and [`RESOLVED`] stamps the resolution timestamp.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status name assigned to newly created tickets
pub const OPEN: &str = "open";

/// Status name that marks a ticket as resolved
pub const RESOLVED: &str = "resolved";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket_statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub display_name: String,

    pub description: Option<String>,

    pub color: String,

    /// Display order (ascending)
    pub sort_order: i32,

    pub is_active: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_resolved(&self) -> bool {
        self.name == RESOLVED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketStatusResponse {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub color: String,
    pub order: i32,
    pub is_active: bool,
}

impl From<Model> for TicketStatusResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            display_name: model.display_name,
            description: model.description,
            color: model.color,
            order: model.sort_order,
            is_active: model.is_active,
        }
    }
}
