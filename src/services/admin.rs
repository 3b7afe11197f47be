//! Admin console: dashboard counters and the user directory.

use rand::{Rng, distributions::Alphanumeric};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{user, Role};
use crate::repositories::{NewUser, TicketRepository, UserChanges, UserRepository};

use super::{is_valid_email, Actor};
use super::reports::format_rate;

/// Global ticket counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tickets: u64,
    /// Tickets that were never resolved
    pub open_tickets: u64,
    pub resolved_tickets: u64,
    /// Percentage with two decimals, e.g. `"66.67"`
    #[schema(example = "66.67")]
    pub resolution_rate: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub department: Option<String>,
}

/// Identity key for users created from the admin console
fn manual_open_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("manual-{}", suffix.to_ascii_lowercase())
}

fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_ascii_lowercase();
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(ServiceError::bad_request(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

pub struct AdminService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdminService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn dashboard_stats(&self, actor: &Actor) -> ServiceResult<DashboardStats> {
        actor.require_admin()?;

        let tickets = TicketRepository::new(self.db);
        let total = tickets.count_all().await?;
        let resolved = tickets.count_resolved().await?;

        Ok(DashboardStats {
            total_tickets: total,
            open_tickets: total.saturating_sub(resolved),
            resolved_tickets: resolved,
            resolution_rate: format_rate(resolved, total),
        })
    }

    pub async fn list_users(&self, actor: &Actor) -> ServiceResult<Vec<user::Model>> {
        actor.require_admin()?;
        Ok(UserRepository::new(self.db).list_all().await?)
    }

    pub async fn create_user(&self, actor: &Actor, input: CreateUserInput) -> ServiceResult<user::Model> {
        actor.require_admin()?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::bad_request("User name is required"));
        }
        let email = normalize_email(&input.email)?;

        let users = UserRepository::new(self.db);
        if users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A user with email {email} already exists"
            )));
        }

        let created = users
            .create(NewUser {
                open_id: manual_open_id(),
                name: Some(name),
                email: Some(email),
                login_method: Some("manual".to_string()),
                role: input.role,
                department: input.department,
            })
            .await?;

        tracing::info!(user_id = created.id, role = %created.role, created_by = actor.id, "User created");
        Ok(created)
    }

    pub async fn update_user(
        &self,
        actor: &Actor,
        user_id: i32,
        input: UpdateUserInput,
    ) -> ServiceResult<user::Model> {
        actor.require_admin()?;

        if user_id == actor.id {
            if input.is_active == Some(false) {
                return Err(ServiceError::bad_request("Admins cannot deactivate themselves"));
            }
            if input.role.is_some_and(|role| role != Role::Admin) {
                return Err(ServiceError::bad_request("Admins cannot change their own role"));
            }
        }

        let users = UserRepository::new(self.db);
        if users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found(format!("User {user_id} not found")));
        }

        let email = input.email.as_deref().map(normalize_email).transpose()?;
        if let Some(email) = &email
            && let Some(other) = users.find_by_email(email).await?
            && other.id != user_id
        {
            return Err(ServiceError::Conflict(format!(
                "A user with email {email} already exists"
            )));
        }

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let updated = users
            .update(
                user_id,
                UserChanges {
                    name,
                    email,
                    role: input.role,
                    is_active: input.is_active,
                    department: input.department,
                },
            )
            .await?;

        tracing::info!(user_id, role = %updated.role, active = updated.is_active, updated_by = actor.id, "User updated");
        Ok(updated)
    }

    /// Soft delete: the account is deactivated, authored records stay
    pub async fn delete_user(&self, actor: &Actor, user_id: i32) -> ServiceResult<()> {
        actor.require_admin()?;

        if user_id == actor.id {
            return Err(ServiceError::bad_request("Admins cannot deactivate themselves"));
        }

        let users = UserRepository::new(self.db);
        if users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found(format!("User {user_id} not found")));
        }
        users.deactivate(user_id).await?;

        tracing::info!(user_id, deactivated_by = actor.id, "User deactivated");
        Ok(())
    }
}
