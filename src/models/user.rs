//! User entity model
//!
//! This module contains the SeaORM entity model for the users table. A user's
//! role drives every authorization decision in the service.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User entity representing an authenticated principal
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    /// External identity key (unique)
    #[sea_orm(unique)]
    pub open_id: String,

    /// Display name
    pub name: Option<String>,

    /// Email address (unique when present)
    #[sea_orm(unique)]
    pub email: Option<String>,

    /// How the user signed in (e.g. `dev`, `manual`)
    pub login_method: Option<String>,

    /// Role used for authorization
    pub role: Role,

    /// Free-form department label
    pub department: Option<String>,

    /// Inactive users keep their history but cannot sign in
    pub is_active: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    pub last_signed_in: DateTimeUtc,
}

/// Role of a user. `technician` and `admin` are collectively "staff".
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    #[default]
    User,

    #[sea_orm(string_value = "technician")]
    Technician,

    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Technicians and admins may see internal comments and triage any ticket.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Technician | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Technician => "technician",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "technician" => Ok(Role::Technician),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Name shown in history entries and comment listings.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("Usuario #{}", self.id))
    }
}

/// Public representation of a user for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: Role,
    pub department: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub created_at: DateTimeUtc,
    #[schema(value_type = String, example = "2025-01-01T12:00:00Z")]
    pub last_signed_in: DateTimeUtc,
}

impl From<Model> for UserResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            open_id: model.open_id,
            name: model.name,
            email: model.email,
            login_method: model.login_method,
            role: model.role,
            department: model.department,
            is_active: model.is_active,
            created_at: model.created_at,
            last_signed_in: model.last_signed_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles() {
        assert!(!Role::User.is_staff());
        assert!(Role::Technician.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn role_parses_from_wire_names() {
        assert_eq!("technician".parse::<Role>().unwrap(), Role::Technician);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(
            serde_json::to_string(&Role::Admin).unwrap(),
            "\"admin\""
        );
    }
}
