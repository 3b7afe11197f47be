//! Test utilities for database testing.
//!
//! Sets up in-memory SQLite databases with every migration applied and the
//! default taxonomy seeded, plus fixtures for users and tickets.

#![allow(dead_code)]

use std::path::Path;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use servyre_it::config::AppConfig;
use servyre_it::models::{Role, category, department, priority, ticket_status};
use servyre_it::repositories::taxonomy::NewCategory;
use servyre_it::repositories::{NewUser, TaxonomyRepository, UserRepository};
use servyre_it::seeds;
use servyre_it::services::Actor;
use servyre_it::services::tickets::CreateTicketInput;

/// Session secret shared by router tests
pub const TEST_SESSION_SECRET: &str = "test-session-secret-test-session-secret";

/// Sets up an in-memory SQLite database with all migrations applied and the
/// default statuses, priorities and departments seeded.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    seeds::seed_defaults(&db).await?;
    Ok(db)
}

/// Config for the `test` profile with uploads under `uploads_dir`
pub fn test_config(uploads_dir: &Path) -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        session_secret: Some(TEST_SESSION_SECRET.to_string()),
        uploads_dir: uploads_dir.to_path_buf(),
        ..AppConfig::default()
    }
}

/// Creates an active user and returns the matching actor.
pub async fn create_user(db: &DatabaseConnection, role: Role, name: &str) -> Result<Actor> {
    let slug = name.to_ascii_lowercase().replace(' ', ".");
    let user = UserRepository::new(db)
        .create(NewUser {
            open_id: format!("test-{slug}"),
            name: Some(name.to_string()),
            email: Some(format!("{slug}@servyre.com")),
            login_method: Some("test".to_string()),
            role,
            department: None,
        })
        .await?;
    Ok(Actor::from(&user))
}

/// Seeded taxonomy rows plus one test category
pub struct Taxonomy {
    pub category: category::Model,
    pub priority: priority::Model,
    pub department: department::Model,
    pub open: ticket_status::Model,
    pub in_progress: ticket_status::Model,
    pub resolved: ticket_status::Model,
    pub closed: ticket_status::Model,
}

async fn status(db: &DatabaseConnection, name: &str) -> Result<ticket_status::Model> {
    TaxonomyRepository::new(db)
        .find_status_by_name(name)
        .await?
        .with_context(|| format!("status {name} not seeded"))
}

pub async fn taxonomy(db: &DatabaseConnection) -> Result<Taxonomy> {
    let repo = TaxonomyRepository::new(db);
    let category = repo
        .create_category(NewCategory {
            name: "Hardware".to_string(),
            description: Some("Equipos y periféricos".to_string()),
            color: "#3B82F6".to_string(),
        })
        .await?;
    let priority = repo
        .find_priority_by_name("medium")
        .await?
        .context("priority not seeded")?;
    let department = repo
        .find_department_by_name("IT")
        .await?
        .context("department not seeded")?;

    Ok(Taxonomy {
        category,
        priority,
        department,
        open: status(db, "open").await?,
        in_progress: status(db, "in_progress").await?,
        resolved: status(db, "resolved").await?,
        closed: status(db, "closed").await?,
    })
}

/// A valid creation request against `taxonomy`
pub fn ticket_input(taxonomy: &Taxonomy, title: &str) -> CreateTicketInput {
    CreateTicketInput {
        title: title.to_string(),
        description: "El equipo no enciende desde esta mañana".to_string(),
        category_id: taxonomy.category.id,
        priority_id: taxonomy.priority.id,
        department_id: taxonomy.department.id,
        user_name: "Ana López".to_string(),
        user_email: "ana.lopez@servyre.com".to_string(),
        branch: None,
    }
}
