//! Folio counter entity model
//!
//! Single-row sequence (`id = 1`) advanced by ticket creation.

use sea_orm::entity::prelude::*;

/// Primary key of the only counter row
pub const FOLIO_COUNTER_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "folio_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    /// Next number to hand out
    pub next_value: i64,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
