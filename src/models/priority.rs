//! Priority entity model
//!
//! A higher `level` means a more urgent ticket.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "priorities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Machine name (`low`, `medium`, `high`, `urgent`)
    #[sea_orm(unique)]
    pub name: String,

    pub display_name: String,

    pub level: i32,

    pub color: String,

    pub is_active: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriorityResponse {
    pub id: i32,
    pub name: String,
    pub display_name: String,
    pub level: i32,
    pub color: String,
    pub is_active: bool,
}

impl From<Model> for PriorityResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            display_name: model.display_name,
            level: model.level,
            color: model.color,
            is_active: model.is_active,
        }
    }
}
