//! Lookup data used by the ticket form and its administration.
//!
//! Reads return active rows only. Admin deletes are soft so existing tickets
//! keep pointing at valid rows.

use std::sync::LazyLock;

use regex::Regex;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};
use crate::models::category::DEFAULT_CATEGORY_COLOR;
use crate::models::{category, category_failure, department, priority, ticket_status, user, Role};
use crate::repositories::taxonomy::{
    CategoryChanges, DepartmentChanges, FailureChanges, NewCategory, NewPriority, PriorityChanges,
};
use crate::repositories::{TaxonomyRepository, UserRepository};

use super::Actor;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern is valid"));

/// `#RRGGBB`
pub fn is_valid_color(color: &str) -> bool {
    COLOR_RE.is_match(color)
}

fn validate_color(color: &str) -> ServiceResult<()> {
    if is_valid_color(color) {
        Ok(())
    } else {
        Err(ServiceError::bad_request(format!(
            "Color '{color}' must be in #RRGGBB format"
        )))
    }
}

fn required_name(name: &str, what: &str) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::bad_request(format!("{what} name is required")));
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `#3B82F6`
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFailureInput {
    pub category_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFailureInput {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriorityInput {
    #[schema(example = "critical")]
    pub name: String,
    #[schema(example = "Crítica")]
    pub display_name: String,
    #[schema(example = 90)]
    pub level: i32,
    #[schema(example = "#DC2626")]
    pub color: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePriorityInput {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub level: Option<i32>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentInput {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentInput {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

pub struct TaxonomyService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TaxonomyService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    fn repo(&self) -> TaxonomyRepository<'a, DatabaseConnection> {
        TaxonomyRepository::new(self.db)
    }

    // Lookups

    pub async fn categories(&self) -> ServiceResult<Vec<category::Model>> {
        Ok(self.repo().list_active_categories().await?)
    }

    pub async fn statuses(&self) -> ServiceResult<Vec<ticket_status::Model>> {
        Ok(self.repo().list_active_statuses().await?)
    }

    pub async fn priorities(&self) -> ServiceResult<Vec<priority::Model>> {
        Ok(self.repo().list_active_priorities().await?)
    }

    pub async fn departments(&self) -> ServiceResult<Vec<department::Model>> {
        Ok(self.repo().list_active_departments().await?)
    }

    /// Active failures of an active category; empty for unknown categories
    pub async fn category_failures(
        &self,
        category_id: i32,
    ) -> ServiceResult<Vec<category_failure::Model>> {
        Ok(self.repo().list_active_failures(category_id).await?)
    }

    /// Active users with the technician role
    pub async fn technicians(&self) -> ServiceResult<Vec<user::Model>> {
        Ok(UserRepository::new(self.db)
            .list_active_by_role(Role::Technician)
            .await?)
    }

    // Categories

    pub async fn create_category(
        &self,
        actor: &Actor,
        input: CreateCategoryInput,
    ) -> ServiceResult<category::Model> {
        actor.require_admin()?;

        let name = required_name(&input.name, "Category")?;
        let color = input
            .color
            .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
        validate_color(&color)?;

        let created = self
            .repo()
            .create_category(NewCategory {
                name,
                description: input.description,
                color,
            })
            .await?;
        tracing::info!(category_id = created.id, created_by = actor.id, "Category created");
        Ok(created)
    }

    pub async fn update_category(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdateCategoryInput,
    ) -> ServiceResult<category::Model> {
        actor.require_admin()?;

        let name = input
            .name
            .as_deref()
            .map(|n| required_name(n, "Category"))
            .transpose()?;
        if let Some(color) = &input.color {
            validate_color(color)?;
        }

        Ok(self
            .repo()
            .update_category(
                id,
                CategoryChanges {
                    name,
                    description: input.description,
                    color: input.color,
                    is_active: input.is_active,
                },
            )
            .await?)
    }

    pub async fn delete_category(&self, actor: &Actor, id: i32) -> ServiceResult<()> {
        actor.require_admin()?;
        self.repo()
            .update_category(
                id,
                CategoryChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(category_id = id, deleted_by = actor.id, "Category deactivated");
        Ok(())
    }

    // Category failures

    pub async fn create_failure(
        &self,
        actor: &Actor,
        input: CreateFailureInput,
    ) -> ServiceResult<category_failure::Model> {
        actor.require_admin()?;

        let name = required_name(&input.name, "Failure")?;
        if self.repo().find_category(input.category_id).await?.is_none() {
            return Err(ServiceError::bad_request(format!(
                "Unknown category {}",
                input.category_id
            )));
        }

        Ok(self.repo().create_failure(input.category_id, name).await?)
    }

    pub async fn update_failure(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdateFailureInput,
    ) -> ServiceResult<category_failure::Model> {
        actor.require_admin()?;

        let name = input
            .name
            .as_deref()
            .map(|n| required_name(n, "Failure"))
            .transpose()?;

        Ok(self
            .repo()
            .update_failure(
                id,
                FailureChanges {
                    name,
                    is_active: input.is_active,
                },
            )
            .await?)
    }

    pub async fn delete_failure(&self, actor: &Actor, id: i32) -> ServiceResult<()> {
        actor.require_admin()?;
        self.repo()
            .update_failure(
                id,
                FailureChanges {
                    name: None,
                    is_active: Some(false),
                },
            )
            .await?;
        Ok(())
    }

    // Priorities

    /// Every priority including inactive ones (admin only)
    pub async fn all_priorities(&self, actor: &Actor) -> ServiceResult<Vec<priority::Model>> {
        actor.require_admin()?;
        Ok(self.repo().list_all_priorities().await?)
    }

    pub async fn create_priority(
        &self,
        actor: &Actor,
        input: CreatePriorityInput,
    ) -> ServiceResult<priority::Model> {
        actor.require_admin()?;

        let name = required_name(&input.name, "Priority")?;
        let display_name = required_name(&input.display_name, "Priority display")?;
        validate_color(&input.color)?;

        if self.repo().find_priority_by_name(&name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Priority '{name}' already exists"
            )));
        }

        let created = self
            .repo()
            .create_priority(NewPriority {
                name,
                display_name,
                level: input.level,
                color: input.color,
            })
            .await?;
        tracing::info!(priority_id = created.id, level = created.level, "Priority created");
        Ok(created)
    }

    pub async fn update_priority(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdatePriorityInput,
    ) -> ServiceResult<priority::Model> {
        actor.require_admin()?;

        let name = input
            .name
            .as_deref()
            .map(|n| required_name(n, "Priority"))
            .transpose()?;
        let display_name = input
            .display_name
            .as_deref()
            .map(|n| required_name(n, "Priority display"))
            .transpose()?;
        if let Some(color) = &input.color {
            validate_color(color)?;
        }

        Ok(self
            .repo()
            .update_priority(
                id,
                PriorityChanges {
                    name,
                    display_name,
                    level: input.level,
                    color: input.color,
                    is_active: input.is_active,
                },
            )
            .await?)
    }

    pub async fn delete_priority(&self, actor: &Actor, id: i32) -> ServiceResult<()> {
        actor.require_admin()?;
        self.repo()
            .update_priority(
                id,
                PriorityChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    // Departments

    /// Every department including inactive ones (admin only)
    pub async fn all_departments(&self, actor: &Actor) -> ServiceResult<Vec<department::Model>> {
        actor.require_admin()?;
        Ok(self.repo().list_all_departments().await?)
    }

    pub async fn create_department(
        &self,
        actor: &Actor,
        input: CreateDepartmentInput,
    ) -> ServiceResult<department::Model> {
        actor.require_admin()?;

        let name = required_name(&input.name, "Department")?;
        if self.repo().find_department_by_name(&name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Department '{name}' already exists"
            )));
        }

        Ok(self.repo().create_department(name).await?)
    }

    pub async fn update_department(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdateDepartmentInput,
    ) -> ServiceResult<department::Model> {
        actor.require_admin()?;

        let name = input
            .name
            .as_deref()
            .map(|n| required_name(n, "Department"))
            .transpose()?;

        Ok(self
            .repo()
            .update_department(
                id,
                DepartmentChanges {
                    name,
                    is_active: input.is_active,
                },
            )
            .await?)
    }

    pub async fn delete_department(&self, actor: &Actor, id: i32) -> ServiceResult<()> {
        actor.require_admin()?;
        self.repo()
            .update_department(
                id,
                DepartmentChanges {
                    name: None,
                    is_active: Some(false),
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_format() {
        assert!(is_valid_color("#3B82F6"));
        assert!(is_valid_color("#abcdef"));
        assert!(!is_valid_color("3B82F6"));
        assert!(!is_valid_color("#3B82F"));
        assert!(!is_valid_color("#3B82F6FF"));
        assert!(!is_valid_color("#GGGGGG"));
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(required_name("  Redes ", "Category").unwrap(), "Redes");
        assert!(matches!(
            required_name("   ", "Category"),
            Err(ServiceError::BadRequest(_))
        ));
    }
}
