//! Category failure entity model (common failure types per category).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "category_failures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub category_id: i32,

    pub name: String,

    pub is_active: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFailureResponse {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub is_active: bool,
}

impl From<Model> for CategoryFailureResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            is_active: model.is_active,
        }
    }
}
