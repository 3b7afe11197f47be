//! Notification emitter and mailbox operations.
//!
//! Emit functions take the caller's connection so notifications are written in
//! the same transaction as the change that triggered them.

use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::error::{ServiceError, ServiceResult};
use crate::models::{notification, ticket, NotificationType, Role};
use crate::repositories::{NewNotification, NotificationRepository, UserRepository};

use super::Actor;

fn ticket_action_url(ticket_id: i32) -> String {
    format!("/tickets/{ticket_id}")
}

async fn emit<C: ConnectionTrait>(db: &C, new_notification: NewNotification) -> ServiceResult<()> {
    let kind = new_notification.kind;
    NotificationRepository::new(db).insert(new_notification).await?;
    counter!("notifications_created_total", "type" => format!("{kind:?}")).increment(1);
    Ok(())
}

/// One `ticket_created` notification per active admin
pub async fn notify_ticket_created<C: ConnectionTrait>(
    db: &C,
    ticket: &ticket::Model,
    creator_name: &str,
) -> ServiceResult<usize> {
    let admins = UserRepository::new(db).list_active_by_role(Role::Admin).await?;

    for admin in &admins {
        emit(
            db,
            NewNotification {
                user_id: admin.id,
                ticket_id: Some(ticket.id),
                title: "Nuevo Ticket Creado".to_string(),
                message: format!("{} ha creado un nuevo ticket: {}", creator_name, ticket.title),
                kind: NotificationType::TicketCreated,
                action_url: Some(ticket_action_url(ticket.id)),
            },
        )
        .await?;
    }

    Ok(admins.len())
}

/// Tell the ticket creator their ticket changed (or was resolved)
pub async fn notify_ticket_updated<C: ConnectionTrait>(
    db: &C,
    ticket: &ticket::Model,
    resolved_now: bool,
    status_display: &str,
) -> ServiceResult<()> {
    let (title, message, kind) = if resolved_now {
        (
            "Tu Ticket ha sido Resuelto",
            format!("Tu ticket {} \"{}\" ha sido resuelto", ticket.ticket_number, ticket.title),
            NotificationType::TicketResolved,
        )
    } else {
        (
            "Tu Ticket ha sido Actualizado",
            format!(
                "Tu ticket {} \"{}\" ha sido actualizado. Estado actual: {}",
                ticket.ticket_number, ticket.title, status_display
            ),
            NotificationType::TicketStatusChanged,
        )
    };

    emit(
        db,
        NewNotification {
            user_id: ticket.created_by_user_id,
            ticket_id: Some(ticket.id),
            title: title.to_string(),
            message,
            kind,
            action_url: Some(ticket_action_url(ticket.id)),
        },
    )
    .await
}

/// Tell a technician a ticket was assigned to them
pub async fn notify_ticket_assigned<C: ConnectionTrait>(
    db: &C,
    ticket: &ticket::Model,
    assignee_id: i32,
) -> ServiceResult<()> {
    emit(
        db,
        NewNotification {
            user_id: assignee_id,
            ticket_id: Some(ticket.id),
            title: "Ticket Asignado".to_string(),
            message: format!(
                "Se te ha asignado el ticket {}: {}",
                ticket.ticket_number, ticket.title
            ),
            kind: NotificationType::TicketAssigned,
            action_url: Some(ticket_action_url(ticket.id)),
        },
    )
    .await
}

/// Tell the ticket creator someone commented on their ticket
pub async fn notify_comment_added<C: ConnectionTrait>(
    db: &C,
    ticket: &ticket::Model,
    author_name: &str,
) -> ServiceResult<()> {
    emit(
        db,
        NewNotification {
            user_id: ticket.created_by_user_id,
            ticket_id: Some(ticket.id),
            title: "Nuevo Comentario en tu Ticket".to_string(),
            message: format!(
                "{} comentó en tu ticket {}: {}",
                author_name, ticket.ticket_number, ticket.title
            ),
            kind: NotificationType::CommentAdded,
            action_url: Some(ticket_action_url(ticket.id)),
        },
    )
    .await
}

/// Per-user mailbox operations
pub struct NotificationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NotificationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// The caller's unread notifications, newest first
    pub async fn get_unread(&self, actor: &Actor) -> ServiceResult<Vec<notification::Model>> {
        Ok(NotificationRepository::new(self.db)
            .list_unread(actor.id)
            .await?)
    }

    /// Mark one of the caller's notifications as read
    pub async fn mark_as_read(&self, actor: &Actor, notification_id: i32) -> ServiceResult<()> {
        let updated = NotificationRepository::new(self.db)
            .mark_read(notification_id, actor.id)
            .await?;

        if updated {
            Ok(())
        } else {
            Err(ServiceError::not_found(format!(
                "Notification {notification_id} not found"
            )))
        }
    }

    /// Mark all of the caller's notifications as read; returns how many changed
    pub async fn mark_all_as_read(&self, actor: &Actor) -> ServiceResult<u64> {
        Ok(NotificationRepository::new(self.db)
            .mark_all_read(actor.id)
            .await?)
    }
}
