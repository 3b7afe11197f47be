//! Database migrations for the Servyre IT ticketing service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_01_01_000001_create_users;
mod m2025_01_01_000002_create_taxonomy;
mod m2025_01_01_000003_create_tickets;
mod m2025_01_01_000004_create_ticket_activity;
mod m2025_01_01_000005_create_notifications;
mod m2025_01_01_000006_create_folio_counters;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_01_000001_create_users::Migration),
            Box::new(m2025_01_01_000002_create_taxonomy::Migration),
            Box::new(m2025_01_01_000003_create_tickets::Migration),
            Box::new(m2025_01_01_000004_create_ticket_activity::Migration),
            Box::new(m2025_01_01_000005_create_notifications::Migration),
            Box::new(m2025_01_01_000006_create_folio_counters::Migration),
        ]
    }
}
