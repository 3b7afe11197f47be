//! # User Repository
//!
//! Data access for the users table. Users are never hard-deleted; deactivation
//! keeps authored tickets, comments and history intact.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::error::RepositoryError;
use crate::models::user::{self, ActiveModel as UserActiveModel, Entity as User, Model as UserModel};
use crate::models::Role;

/// Data required to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: Role,
    pub department: Option<String>,
}

/// Partial update of a user; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub department: Option<String>,
}

/// Repository for User database operations
pub struct UserRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_open_id(&self, open_id: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::OpenId.eq(open_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Display names for the given user ids (unknown ids are absent)
    pub async fn display_names(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(users
            .into_iter()
            .map(|user| (user.id, user.display_name()))
            .collect())
    }

    /// All users, most recently created first
    pub async fn list_all(&self) -> Result<Vec<UserModel>, RepositoryError> {
        User::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Active users holding `role`, ordered by name
    pub async fn list_active_by_role(&self, role: Role) -> Result<Vec<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::Role.eq(role))
            .filter(user::Column::IsActive.eq(true))
            .order_by_asc(user::Column::Name)
            .order_by_asc(user::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Insert a new active user
    ///
    /// # Returns
    ///
    /// The persisted model. A duplicate `open_id` or `email` surfaces as a
    /// database error carrying a unique violation.
    pub async fn create(&self, new_user: NewUser) -> Result<UserModel, RepositoryError> {
        let now = Utc::now();
        let model = UserActiveModel {
            open_id: Set(new_user.open_id),
            name: Set(new_user.name),
            email: Set(new_user.email),
            login_method: Set(new_user.login_method),
            role: Set(new_user.role),
            department: Set(new_user.department),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            last_signed_in: Set(now),
            ..Default::default()
        };

        model
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<UserModel, RepositoryError> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("User {id}")))?;

        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(Some(name));
        }
        if let Some(email) = changes.email {
            active.email = Set(Some(email));
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(department) = changes.department {
            active.department = Set(Some(department));
        }
        active.updated_at = Set(Utc::now());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Soft delete: the user can no longer sign in
    pub async fn deactivate(&self, id: i32) -> Result<UserModel, RepositoryError> {
        self.update(
            id,
            UserChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Insert or refresh a user keyed by `open_id`, stamping `last_signed_in`.
    pub async fn upsert_sign_in(&self, new_user: NewUser) -> Result<UserModel, RepositoryError> {
        match self.find_by_open_id(&new_user.open_id).await? {
            Some(existing) => {
                let now = Utc::now();
                let mut active = existing.into_active_model();
                active.name = Set(new_user.name);
                active.email = Set(new_user.email);
                active.login_method = Set(new_user.login_method);
                active.role = Set(new_user.role);
                active.department = Set(new_user.department);
                active.is_active = Set(true);
                active.last_signed_in = Set(now);
                active.updated_at = Set(now);
                active
                    .update(self.db)
                    .await
                    .map_err(RepositoryError::database_error)
            }
            None => self.create(new_user).await,
        }
    }
}
