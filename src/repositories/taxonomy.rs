//! # Taxonomy Repository
//!
//! Data access for categories, category failures, priorities, ticket statuses
//! and departments. Deletion is always a soft delete (`is_active = false`) so
//! historical tickets keep valid references.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::error::RepositoryError;
use crate::models::{
    category, category_failure, department, priority, ticket_status, Category, CategoryFailure,
    Department, Priority, TicketStatus,
};

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct FailureChanges {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewPriority {
    pub name: String,
    pub display_name: String,
    pub level: i32,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct PriorityChanges {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub level: Option<i32>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewStatus {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub color: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentChanges {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for ticket taxonomy tables
pub struct TaxonomyRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TaxonomyRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    // Categories

    pub async fn list_active_categories(&self) -> Result<Vec<category::Model>, RepositoryError> {
        Category::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_all_categories(&self) -> Result<Vec<category::Model>, RepositoryError> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_category(&self, id: i32) -> Result<Option<category::Model>, RepositoryError> {
        Category::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create_category(
        &self,
        new_category: NewCategory,
    ) -> Result<category::Model, RepositoryError> {
        let now = Utc::now();
        category::ActiveModel {
            name: Set(new_category.name),
            description: Set(new_category.description),
            color: Set(new_category.color),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn update_category(
        &self,
        id: i32,
        changes: CategoryChanges,
    ) -> Result<category::Model, RepositoryError> {
        let existing = self
            .find_category(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Category {id}")))?;

        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    // Category failures

    pub async fn list_active_failures(
        &self,
        category_id: i32,
    ) -> Result<Vec<category_failure::Model>, RepositoryError> {
        CategoryFailure::find()
            .filter(category_failure::Column::CategoryId.eq(category_id))
            .filter(category_failure::Column::IsActive.eq(true))
            .order_by_asc(category_failure::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_failure(
        &self,
        id: i32,
    ) -> Result<Option<category_failure::Model>, RepositoryError> {
        CategoryFailure::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create_failure(
        &self,
        category_id: i32,
        name: String,
    ) -> Result<category_failure::Model, RepositoryError> {
        category_failure::ActiveModel {
            category_id: Set(category_id),
            name: Set(name),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn update_failure(
        &self,
        id: i32,
        changes: FailureChanges,
    ) -> Result<category_failure::Model, RepositoryError> {
        let existing = self
            .find_failure(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Category failure {id}")))?;

        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    // Priorities

    /// Active priorities, most urgent first
    pub async fn list_active_priorities(&self) -> Result<Vec<priority::Model>, RepositoryError> {
        Priority::find()
            .filter(priority::Column::IsActive.eq(true))
            .order_by_desc(priority::Column::Level)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every priority including inactive ones, most urgent first
    pub async fn list_all_priorities(&self) -> Result<Vec<priority::Model>, RepositoryError> {
        Priority::find()
            .order_by_desc(priority::Column::Level)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_priority(&self, id: i32) -> Result<Option<priority::Model>, RepositoryError> {
        Priority::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_priority_by_name(
        &self,
        name: &str,
    ) -> Result<Option<priority::Model>, RepositoryError> {
        Priority::find()
            .filter(priority::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create_priority(
        &self,
        new_priority: NewPriority,
    ) -> Result<priority::Model, RepositoryError> {
        priority::ActiveModel {
            name: Set(new_priority.name),
            display_name: Set(new_priority.display_name),
            level: Set(new_priority.level),
            color: Set(new_priority.color),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn update_priority(
        &self,
        id: i32,
        changes: PriorityChanges,
    ) -> Result<priority::Model, RepositoryError> {
        let existing = self
            .find_priority(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Priority {id}")))?;

        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(display_name) = changes.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(level) = changes.level {
            active.level = Set(level);
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    // Ticket statuses

    /// Active statuses in display order
    pub async fn list_active_statuses(&self) -> Result<Vec<ticket_status::Model>, RepositoryError> {
        TicketStatus::find()
            .filter(ticket_status::Column::IsActive.eq(true))
            .order_by_asc(ticket_status::Column::SortOrder)
            .order_by_asc(ticket_status::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every status including inactive ones, in display order
    pub async fn list_all_statuses(&self) -> Result<Vec<ticket_status::Model>, RepositoryError> {
        TicketStatus::find()
            .order_by_asc(ticket_status::Column::SortOrder)
            .order_by_asc(ticket_status::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_status(
        &self,
        id: i32,
    ) -> Result<Option<ticket_status::Model>, RepositoryError> {
        TicketStatus::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_status_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ticket_status::Model>, RepositoryError> {
        TicketStatus::find()
            .filter(ticket_status::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create_status(
        &self,
        new_status: NewStatus,
    ) -> Result<ticket_status::Model, RepositoryError> {
        ticket_status::ActiveModel {
            name: Set(new_status.name),
            display_name: Set(new_status.display_name),
            description: Set(new_status.description),
            color: Set(new_status.color),
            sort_order: Set(new_status.sort_order),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    // Departments

    pub async fn list_active_departments(
        &self,
    ) -> Result<Vec<department::Model>, RepositoryError> {
        Department::find()
            .filter(department::Column::IsActive.eq(true))
            .order_by_asc(department::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn list_all_departments(&self) -> Result<Vec<department::Model>, RepositoryError> {
        Department::find()
            .order_by_asc(department::Column::Name)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_department(
        &self,
        id: i32,
    ) -> Result<Option<department::Model>, RepositoryError> {
        Department::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_department_by_name(
        &self,
        name: &str,
    ) -> Result<Option<department::Model>, RepositoryError> {
        Department::find()
            .filter(department::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create_department(
        &self,
        name: String,
    ) -> Result<department::Model, RepositoryError> {
        department::ActiveModel {
            name: Set(name),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn update_department(
        &self,
        id: i32,
        changes: DepartmentChanges,
    ) -> Result<department::Model, RepositoryError> {
        let existing = self
            .find_department(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Department {id}")))?;

        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
