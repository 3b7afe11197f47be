//! Default taxonomy seeding

use anyhow::Result;
use sea_orm::ConnectionTrait;

use crate::models::ticket_status;
use crate::repositories::TaxonomyRepository;
use crate::repositories::taxonomy::{NewPriority, NewStatus};

struct StatusSeed {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    color: &'static str,
    sort_order: i32,
}

struct PrioritySeed {
    name: &'static str,
    display_name: &'static str,
    level: i32,
    color: &'static str,
}

const STATUSES: &[StatusSeed] = &[
    StatusSeed {
        name: ticket_status::OPEN,
        display_name: "Abierto",
        description: "Ticket recién creado",
        color: "#3B82F6",
        sort_order: 1,
    },
    StatusSeed {
        name: "in_progress",
        display_name: "En Progreso",
        description: "Un técnico está trabajando en el ticket",
        color: "#F59E0B",
        sort_order: 2,
    },
    StatusSeed {
        name: "pending",
        display_name: "Pendiente",
        description: "En espera de información o de un tercero",
        color: "#6B7280",
        sort_order: 3,
    },
    StatusSeed {
        name: ticket_status::RESOLVED,
        display_name: "Resuelto",
        description: "El problema fue resuelto",
        color: "#10B981",
        sort_order: 4,
    },
    StatusSeed {
        name: "closed",
        display_name: "Cerrado",
        description: "Ticket cerrado",
        color: "#000000",
        sort_order: 5,
    },
];

const PRIORITIES: &[PrioritySeed] = &[
    PrioritySeed {
        name: "low",
        display_name: "Baja",
        level: 10,
        color: "#9CA3AF",
    },
    PrioritySeed {
        name: "medium",
        display_name: "Media",
        level: 50,
        color: "#3B82F6",
    },
    PrioritySeed {
        name: "high",
        display_name: "Alta",
        level: 80,
        color: "#F59E0B",
    },
    PrioritySeed {
        name: "urgent",
        display_name: "¡Urgente!",
        level: 100,
        color: "#EF4444",
    },
];

const DEPARTMENTS: &[&str] = &["IT", "Licitaciones", "Compras", "Recursos Humanos", "Dirección"];

/// Seeds statuses, priorities and departments
pub async fn seed_defaults<C: ConnectionTrait>(db: &C) -> Result<()> {
    seed_statuses(db).await?;
    seed_priorities(db).await?;
    seed_departments(db).await?;
    log::info!("Taxonomy seeding completed successfully");
    Ok(())
}

/// Seeds the default ticket statuses
///
/// # Returns
///
/// The number of statuses created
pub async fn seed_statuses<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let repo = TaxonomyRepository::new(db);
    let mut created = 0;

    for seed in STATUSES {
        if repo.find_status_by_name(seed.name).await?.is_some() {
            log::debug!("Status '{}' already exists, skipping", seed.name);
            continue;
        }

        repo.create_status(NewStatus {
            name: seed.name.to_string(),
            display_name: seed.display_name.to_string(),
            description: Some(seed.description.to_string()),
            color: seed.color.to_string(),
            sort_order: seed.sort_order,
        })
        .await?;
        log::info!("Created ticket status: {}", seed.name);
        created += 1;
    }

    Ok(created)
}

/// Seeds the default priorities
///
/// # Returns
///
/// The number of priorities created
pub async fn seed_priorities<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let repo = TaxonomyRepository::new(db);
    let mut created = 0;

    for seed in PRIORITIES {
        if repo.find_priority_by_name(seed.name).await?.is_some() {
            log::debug!("Priority '{}' already exists, skipping", seed.name);
            continue;
        }

        repo.create_priority(NewPriority {
            name: seed.name.to_string(),
            display_name: seed.display_name.to_string(),
            level: seed.level,
            color: seed.color.to_string(),
        })
        .await?;
        log::info!("Created priority: {}", seed.name);
        created += 1;
    }

    Ok(created)
}

/// Seeds the default departments
///
/// # Returns
///
/// The number of departments created
pub async fn seed_departments<C: ConnectionTrait>(db: &C) -> Result<usize> {
    let repo = TaxonomyRepository::new(db);
    let mut created = 0;

    for name in DEPARTMENTS {
        if repo.find_department_by_name(name).await?.is_some() {
            log::debug!("Department '{}' already exists, skipping", name);
            continue;
        }

        repo.create_department(name.to_string()).await?;
        log::info!("Created department: {}", name);
        created += 1;
    }

    Ok(created)
}
