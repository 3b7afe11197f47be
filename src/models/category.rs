//! Category entity model
//!
//! Categories classify tickets (hardware, network, ...). Each category owns a
//! list of [`super::category_failure`] rows describing common failures.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default color for categories created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub description: Option<String>,

    /// Hex color (`#RRGGBB`)
    pub color: String,

    pub is_active: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::category_failure::Entity")]
    CategoryFailure,
}

impl Related<super::category_failure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryFailure.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,
}

impl From<Model> for CategoryResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            color: model.color,
            is_active: model.is_active,
        }
    }
}
