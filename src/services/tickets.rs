//! Ticket lifecycle: creation, triage updates, administrative overwrite and
//! deletion, plus the read paths with their access rules.
//!
//! Every mutation that touches more than one row runs in a single
//! transaction: the ticket change, its history entries and the notifications
//! it triggers commit or roll back together.

use std::collections::HashMap;

use chrono::Utc;
use metrics::counter;
use sea_orm::{DatabaseConnection, IntoActiveModel, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};
use crate::models::ticket::TicketResponse;
use crate::models::{ticket, ticket_history, ticket_status, Branch, ChangeType};
use crate::repositories::{
    HistoryRepository, NewHistoryEntry, NewTicket, TaxonomyRepository, TicketRepository,
    UserRepository,
};

use super::{folio, is_valid_email, notifications, Actor};

pub const MIN_TITLE_CHARS: usize = 3;
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Input for [`TicketService::create`]
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketInput {
    #[schema(example = "La impresora no imprime")]
    pub title: String,
    #[schema(example = "La impresora del segundo piso muestra error de papel atascado")]
    pub description: String,
    pub category_id: i32,
    pub priority_id: i32,
    pub department_id: i32,
    #[schema(example = "Ana López")]
    pub user_name: String,
    #[schema(example = "ana.lopez@servyre.com")]
    pub user_email: String,
    /// Defaults to `SRV`
    #[serde(default)]
    pub branch: Option<Branch>,
}

/// Identifiers of a newly created ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTicket {
    pub ticket_id: i32,
    #[schema(example = "TKT-SRV-1000")]
    pub ticket_number: String,
    #[schema(example = "SRV - 1000")]
    pub folio: String,
}

/// Input for [`TicketService::update`]; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketInput {
    pub status_id: Option<i32>,
    pub priority_id: Option<i32>,
    pub assigned_to_user_id: Option<i32>,
    pub technical_report: Option<String>,
    pub resolution_notes: Option<String>,
}

/// Input for [`TicketService::admin_update`]; every field is overwritten
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateTicketInput {
    pub title: String,
    pub description: String,
    pub status_id: i32,
    pub priority_id: i32,
    pub category_id: i32,
}

/// Ticket row enriched for list views
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketListItem {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub creator_name: Option<String>,
    pub comment_count: i64,
}

/// Checks a creation request before anything is written.
///
/// Returns the input with text fields trimmed.
pub fn validate_new_ticket(
    mut input: CreateTicketInput,
    email_domain: &str,
) -> ServiceResult<CreateTicketInput> {
    input.title = input.title.trim().to_string();
    input.description = input.description.trim().to_string();
    input.user_name = input.user_name.trim().to_string();
    input.user_email = input.user_email.trim().to_string();

    if input.title.chars().count() < MIN_TITLE_CHARS {
        return Err(ServiceError::bad_request(format!(
            "Title must be at least {MIN_TITLE_CHARS} characters"
        )));
    }
    if input.description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(ServiceError::bad_request(format!(
            "Description must be at least {MIN_DESCRIPTION_CHARS} characters"
        )));
    }
    if input.user_name.is_empty() {
        return Err(ServiceError::bad_request("Requester name is required"));
    }
    if !is_valid_email(&input.user_email) {
        return Err(ServiceError::bad_request("Requester email is not a valid address"));
    }
    let marker = format!("@{}.", email_domain.to_ascii_lowercase());
    if !input.user_email.to_ascii_lowercase().contains(&marker) {
        return Err(ServiceError::bad_request(format!(
            "Requester email must be a corporate address ({marker})"
        )));
    }

    Ok(input)
}

/// Creator or staff
pub fn can_access(actor: &Actor, ticket: &ticket::Model) -> bool {
    actor.is_staff() || ticket.created_by_user_id == actor.id
}

/// Ticket lifecycle operations
pub struct TicketService<'a> {
    db: &'a DatabaseConnection,
    email_domain: &'a str,
}

impl<'a> TicketService<'a> {
    pub fn new(db: &'a DatabaseConnection, email_domain: &'a str) -> Self {
        Self { db, email_domain }
    }

    /// File a new ticket.
    ///
    /// Validation and taxonomy checks happen before any write. The folio, the
    /// ticket row, its `created` history entry and one notification per
    /// active admin are then written in one transaction.
    pub async fn create(&self, actor: &Actor, input: CreateTicketInput) -> ServiceResult<CreatedTicket> {
        let input = validate_new_ticket(input, self.email_domain)?;
        let branch = input.branch.unwrap_or_default();

        let taxonomy = TaxonomyRepository::new(self.db);
        match taxonomy.find_category(input.category_id).await? {
            Some(category) if category.is_active => {}
            _ => return Err(ServiceError::bad_request("Unknown or inactive category")),
        }
        match taxonomy.find_priority(input.priority_id).await? {
            Some(priority) if priority.is_active => {}
            _ => return Err(ServiceError::bad_request("Unknown or inactive priority")),
        }
        match taxonomy.find_department(input.department_id).await? {
            Some(department) if department.is_active => {}
            _ => return Err(ServiceError::bad_request("Unknown or inactive department")),
        }
        let initial_status = self.initial_status().await?;

        let txn = self.db.begin().await?;

        let number = folio::allocate(&txn).await?;
        let ticket = TicketRepository::new(&txn)
            .insert(NewTicket {
                branch,
                folio: folio::format_folio(branch, number),
                ticket_number: folio::format_ticket_number(branch, number),
                title: input.title,
                description: input.description,
                category_id: input.category_id,
                status_id: initial_status.id,
                priority_id: input.priority_id,
                department_id: input.department_id,
                created_by_user_id: actor.id,
                user_name: input.user_name,
                user_email: input.user_email,
            })
            .await?;

        HistoryRepository::new(&txn)
            .append(NewHistoryEntry {
                ticket_id: ticket.id,
                changed_by_user_id: actor.id,
                field_name: "ticket".to_string(),
                change_type: ChangeType::Created,
                old_value: None,
                new_value: Some(ticket.ticket_number.clone()),
                description: Some("Ticket creado".to_string()),
            })
            .await?;

        let notified = notifications::notify_ticket_created(&txn, &ticket, &actor.name).await?;

        txn.commit().await?;

        counter!("tickets_created_total", "branch" => branch.as_str()).increment(1);
        tracing::info!(
            ticket_id = ticket.id,
            ticket_number = %ticket.ticket_number,
            created_by = actor.id,
            admins_notified = notified,
            "Ticket created"
        );

        Ok(CreatedTicket {
            ticket_id: ticket.id,
            ticket_number: ticket.ticket_number,
            folio: ticket.folio,
        })
    }

    /// Status named `open`, else the first active status in display order
    async fn initial_status(&self) -> ServiceResult<crate::models::ticket_status::Model> {
        let taxonomy = TaxonomyRepository::new(self.db);
        if let Some(status) = taxonomy.find_status_by_name(ticket_status::OPEN).await? {
            return Ok(status);
        }

        taxonomy
            .list_active_statuses()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::internal("No ticket statuses are configured"))
    }

    /// Triage update by a technician or admin.
    ///
    /// One history entry is written per field whose value actually changes.
    /// Entering the `resolved` status stamps `resolved_at` the first time; the
    /// stamp is never cleared afterwards. The creator is notified on every
    /// update, even one that changes nothing, and a newly assigned technician
    /// gets their own notification.
    pub async fn update(
        &self,
        actor: &Actor,
        ticket_id: i32,
        input: UpdateTicketInput,
    ) -> ServiceResult<ticket::Model> {
        actor.require_staff()?;

        let txn = self.db.begin().await?;
        let tickets = TicketRepository::new(&txn);
        let taxonomy = TaxonomyRepository::new(&txn);
        let users = UserRepository::new(&txn);

        let existing = tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Ticket {ticket_id} not found")))?;

        let now = Utc::now();
        let mut active = existing.clone().into_active_model();
        let mut changes: Vec<NewHistoryEntry> = Vec::new();
        let mut resolved_now = false;
        let mut newly_assigned = None;

        let current_status = taxonomy.find_status(existing.status_id).await?;
        let mut status_display = current_status
            .as_ref()
            .map(|s| s.display_name.clone())
            .unwrap_or_default();

        let entry = |field: &str, change_type, old: Option<String>, new: Option<String>, description: String| {
            NewHistoryEntry {
                ticket_id,
                changed_by_user_id: actor.id,
                field_name: field.to_string(),
                change_type,
                old_value: old,
                new_value: new,
                description: Some(description),
            }
        };

        if let Some(status_id) = input.status_id.filter(|id| *id != existing.status_id) {
            let new_status = taxonomy
                .find_status(status_id)
                .await?
                .ok_or_else(|| ServiceError::bad_request(format!("Unknown status {status_id}")))?;

            changes.push(entry(
                "status",
                ChangeType::StatusChanged,
                Some(status_display.clone()),
                Some(new_status.display_name.clone()),
                format!(
                    "Estado cambiado de {} a {}",
                    status_display, new_status.display_name
                ),
            ));
            active.status_id = Set(status_id);

            if new_status.is_resolved() && existing.resolved_at.is_none() {
                active.resolved_at = Set(Some(now));
                resolved_now = true;
            }
            status_display = new_status.display_name;
        }

        if let Some(priority_id) = input.priority_id.filter(|id| *id != existing.priority_id) {
            let new_priority = taxonomy
                .find_priority(priority_id)
                .await?
                .ok_or_else(|| ServiceError::bad_request(format!("Unknown priority {priority_id}")))?;
            let old_display = taxonomy
                .find_priority(existing.priority_id)
                .await?
                .map(|p| p.display_name)
                .unwrap_or_default();

            changes.push(entry(
                "priority",
                ChangeType::PriorityChanged,
                Some(old_display.clone()),
                Some(new_priority.display_name.clone()),
                format!(
                    "Prioridad cambiada de {} a {}",
                    old_display, new_priority.display_name
                ),
            ));
            active.priority_id = Set(priority_id);
        }

        if let Some(assignee_id) = input
            .assigned_to_user_id
            .filter(|id| Some(*id) != existing.assigned_to_user_id)
        {
            let assignee = match users.find_by_id(assignee_id).await? {
                Some(user) if user.is_active && user.role.is_staff() => user,
                _ => {
                    return Err(ServiceError::bad_request(
                        "Tickets can only be assigned to active technicians or admins",
                    ));
                }
            };
            let old_name = match existing.assigned_to_user_id {
                Some(old_id) => users.find_by_id(old_id).await?.map(|u| u.display_name()),
                None => None,
            };

            changes.push(entry(
                "assignedTo",
                ChangeType::Assigned,
                old_name,
                Some(assignee.display_name()),
                format!("Ticket asignado a {}", assignee.display_name()),
            ));
            active.assigned_to_user_id = Set(Some(assignee_id));
            newly_assigned = Some(assignee_id);
        }

        if let Some(report) = input
            .technical_report
            .filter(|r| existing.technical_report.as_ref() != Some(r))
        {
            changes.push(entry(
                "technicalReport",
                ChangeType::Other,
                existing.technical_report.clone(),
                Some(report.clone()),
                "Reporte técnico actualizado".to_string(),
            ));
            active.technical_report = Set(Some(report));
        }

        if let Some(notes) = input
            .resolution_notes
            .filter(|n| existing.resolution_notes.as_ref() != Some(n))
        {
            changes.push(entry(
                "resolutionNotes",
                ChangeType::Other,
                existing.resolution_notes.clone(),
                Some(notes.clone()),
                "Notas de resolución actualizadas".to_string(),
            ));
            active.resolution_notes = Set(Some(notes));
        }

        active.updated_at = Set(now);
        let updated = tickets.save(active).await?;

        let history = HistoryRepository::new(&txn);
        let change_count = changes.len();
        for change in changes {
            history.append(change).await?;
        }

        notifications::notify_ticket_updated(&txn, &updated, resolved_now, &status_display).await?;
        if let Some(assignee_id) = newly_assigned
            && assignee_id != updated.created_by_user_id
        {
            notifications::notify_ticket_assigned(&txn, &updated, assignee_id).await?;
        }

        txn.commit().await?;

        if resolved_now {
            counter!("tickets_resolved_total").increment(1);
        }
        tracing::info!(
            ticket_id,
            changed_by = actor.id,
            changes = change_count,
            resolved = resolved_now,
            "Ticket updated"
        );

        Ok(updated)
    }

    /// Administrative overwrite of the descriptive fields.
    ///
    /// Writes a single generic history entry, leaves `resolved_at` alone and
    /// sends no notification.
    pub async fn admin_update(
        &self,
        actor: &Actor,
        ticket_id: i32,
        input: AdminUpdateTicketInput,
    ) -> ServiceResult<ticket::Model> {
        actor.require_admin()?;

        let title = input.title.trim().to_string();
        let description = input.description.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::bad_request("Title is required"));
        }
        if description.is_empty() {
            return Err(ServiceError::bad_request("Description is required"));
        }

        let txn = self.db.begin().await?;
        let tickets = TicketRepository::new(&txn);
        let taxonomy = TaxonomyRepository::new(&txn);

        let existing = tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Ticket {ticket_id} not found")))?;

        if taxonomy.find_status(input.status_id).await?.is_none() {
            return Err(ServiceError::bad_request(format!("Unknown status {}", input.status_id)));
        }
        if taxonomy.find_priority(input.priority_id).await?.is_none() {
            return Err(ServiceError::bad_request(format!(
                "Unknown priority {}",
                input.priority_id
            )));
        }
        if taxonomy.find_category(input.category_id).await?.is_none() {
            return Err(ServiceError::bad_request(format!(
                "Unknown category {}",
                input.category_id
            )));
        }

        let mut active = existing.into_active_model();
        active.title = Set(title);
        active.description = Set(description);
        active.status_id = Set(input.status_id);
        active.priority_id = Set(input.priority_id);
        active.category_id = Set(input.category_id);
        active.updated_at = Set(Utc::now());
        let updated = tickets.save(active).await?;

        HistoryRepository::new(&txn)
            .append(NewHistoryEntry {
                ticket_id,
                changed_by_user_id: actor.id,
                field_name: "admin_update".to_string(),
                change_type: ChangeType::Update,
                old_value: None,
                new_value: None,
                description: Some("Actualización administrativa del ticket".to_string()),
            })
            .await?;

        txn.commit().await?;
        tracing::info!(ticket_id, changed_by = actor.id, "Ticket overwritten by admin");

        Ok(updated)
    }

    /// Permanently remove a ticket with its comments, history and notifications
    pub async fn delete_admin(&self, actor: &Actor, ticket_id: i32) -> ServiceResult<()> {
        actor.require_admin()?;

        let txn = self.db.begin().await?;
        let tickets = TicketRepository::new(&txn);

        if tickets.find_by_id(ticket_id).await?.is_none() {
            return Err(ServiceError::not_found(format!("Ticket {ticket_id} not found")));
        }

        let deleted = tickets.delete_with_dependents(ticket_id).await?;
        txn.commit().await?;

        tracing::warn!(
            ticket_id,
            deleted_by = actor.id,
            comments = deleted.comments,
            history = deleted.history,
            notifications = deleted.notifications,
            "Ticket deleted"
        );
        Ok(())
    }

    pub async fn get_by_id(&self, actor: &Actor, ticket_id: i32) -> ServiceResult<ticket::Model> {
        let ticket = TicketRepository::new(self.db)
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Ticket {ticket_id} not found")))?;

        if !can_access(actor, &ticket) {
            return Err(ServiceError::forbidden("You do not have access to this ticket"));
        }

        Ok(ticket)
    }

    /// Tickets filed by the caller, newest first
    pub async fn list_mine(&self, actor: &Actor) -> ServiceResult<Vec<TicketListItem>> {
        let tickets = TicketRepository::new(self.db)
            .list_by_creator(actor.id)
            .await?;
        self.enrich(tickets).await
    }

    /// Every ticket, newest first (staff only)
    pub async fn list_all(&self, actor: &Actor) -> ServiceResult<Vec<TicketListItem>> {
        actor.require_staff()?;
        let tickets = TicketRepository::new(self.db).list_all().await?;
        self.enrich(tickets).await
    }

    /// Chronological history; empty when the ticket is missing or not visible
    pub async fn get_history(
        &self,
        actor: &Actor,
        ticket_id: i32,
    ) -> ServiceResult<Vec<ticket_history::Model>> {
        let Some(ticket) = TicketRepository::new(self.db).find_by_id(ticket_id).await? else {
            return Ok(Vec::new());
        };
        if !can_access(actor, &ticket) {
            return Ok(Vec::new());
        }

        Ok(HistoryRepository::new(self.db)
            .list_for_ticket(ticket_id)
            .await?)
    }

    async fn enrich(&self, tickets: Vec<ticket::Model>) -> ServiceResult<Vec<TicketListItem>> {
        let ticket_ids: Vec<i32> = tickets.iter().map(|t| t.id).collect();
        let mut creator_ids: Vec<i32> = tickets.iter().map(|t| t.created_by_user_id).collect();
        creator_ids.sort_unstable();
        creator_ids.dedup();

        let names: HashMap<i32, String> = UserRepository::new(self.db)
            .display_names(&creator_ids)
            .await?;
        let counts = TicketRepository::new(self.db)
            .comment_counts(&ticket_ids)
            .await?;

        Ok(tickets
            .into_iter()
            .map(|ticket| TicketListItem {
                creator_name: names.get(&ticket.created_by_user_id).cloned(),
                comment_count: counts.get(&ticket.id).copied().unwrap_or(0),
                ticket: ticket.into(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateTicketInput {
        CreateTicketInput {
            title: "Sin internet".to_string(),
            description: "No hay conexión en el piso 3 desde la mañana".to_string(),
            category_id: 1,
            priority_id: 1,
            department_id: 1,
            user_name: "Ana López".to_string(),
            user_email: "ana@servyre.com".to_string(),
            branch: None,
        }
    }

    #[test]
    fn accepts_corporate_request() {
        let validated = validate_new_ticket(
            CreateTicketInput {
                title: "  Sin internet  ".to_string(),
                ..input()
            },
            "servyre",
        )
        .unwrap();
        assert_eq!(validated.title, "Sin internet");
    }

    #[test]
    fn rejects_short_fields() {
        let short_title = CreateTicketInput {
            title: "ab".to_string(),
            ..input()
        };
        assert!(matches!(
            validate_new_ticket(short_title, "servyre"),
            Err(ServiceError::BadRequest(_))
        ));

        let short_description = CreateTicketInput {
            description: "corta".to_string(),
            ..input()
        };
        assert!(validate_new_ticket(short_description, "servyre").is_err());

        let no_name = CreateTicketInput {
            user_name: "   ".to_string(),
            ..input()
        };
        assert!(validate_new_ticket(no_name, "servyre").is_err());
    }

    #[test]
    fn rejects_non_corporate_email() {
        for email in ["a@gmail.com", "not-an-email", "ana@servyre", "ana@notservyre.com"] {
            let request = CreateTicketInput {
                user_email: email.to_string(),
                ..input()
            };
            assert!(
                validate_new_ticket(request, "servyre").is_err(),
                "{email} should be rejected"
            );
        }

        let subsidiary = CreateTicketInput {
            user_email: "Ana@Servyre.com.mx".to_string(),
            ..input()
        };
        assert!(validate_new_ticket(subsidiary, "servyre").is_ok());
    }

    #[test]
    fn access_rule() {
        let ticket = ticket::Model {
            id: 1,
            branch: Branch::Srv,
            folio: "SRV - 1000".to_string(),
            ticket_number: "TKT-SRV-1000".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            category_id: 1,
            status_id: 1,
            priority_id: 1,
            department_id: 1,
            created_by_user_id: 10,
            assigned_to_user_id: None,
            user_name: "n".to_string(),
            user_email: "e".to_string(),
            technical_report: None,
            resolution_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            resolved_at: None,
        };

        assert!(can_access(&Actor::new(10, crate::models::Role::User, "owner"), &ticket));
        assert!(!can_access(&Actor::new(11, crate::models::Role::User, "other"), &ticket));
        assert!(can_access(&Actor::new(12, crate::models::Role::Technician, "tech"), &ticket));
    }
}
