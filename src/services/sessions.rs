//! Development sign-in.
//!
//! With dev login enabled, any of the three roles can be assumed without an
//! identity provider. Each role maps to a fixed local account that is created
//! on first use.

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::sign_session;
use crate::config::AppConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{user, Role};
use crate::repositories::{NewUser, UserRepository};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DevLoginInput {
    pub role: Role,
}

/// Signed-in user and the session token issued for it
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub user: user::Model,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenResponse {
    pub token: String,
    pub user: user::UserResponse,
}

/// Local account for a role
pub fn dev_account(role: Role) -> NewUser {
    let (name, department) = match role {
        Role::Admin => ("Administrador", "Soporte"),
        Role::Technician => ("Técnico Local", "Soporte"),
        Role::User => ("Usuario Local", "General"),
    };

    NewUser {
        open_id: format!("dev-{role}"),
        name: Some(name.to_string()),
        email: Some(format!("{role}@local.test")),
        login_method: Some("dev".to_string()),
        role,
        department: Some(department.to_string()),
    }
}

pub struct SessionService<'a> {
    db: &'a DatabaseConnection,
    config: &'a AppConfig,
}

impl<'a> SessionService<'a> {
    pub fn new(db: &'a DatabaseConnection, config: &'a AppConfig) -> Self {
        Self { db, config }
    }

    /// Sign in as the local account for `role`
    pub async fn dev_login(&self, role: Role) -> ServiceResult<SessionGrant> {
        if !self.config.dev_login_enabled {
            return Err(ServiceError::forbidden("Development login is disabled"));
        }

        let user = UserRepository::new(self.db)
            .upsert_sign_in(dev_account(role))
            .await?;
        let token = sign_session(self.config.session_key(), &user.open_id)
            .ok_or_else(|| ServiceError::internal("Failed to sign session token"))?;

        tracing::info!(user_id = user.id, role = %role, "Development sign-in");
        Ok(SessionGrant { user, token })
    }
}
