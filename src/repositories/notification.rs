//! # Notification Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::sea_query::Expr;

use crate::error::RepositoryError;
use crate::models::{notification, Notification, NotificationType};

/// Data required to insert a notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i32,
    pub ticket_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub action_url: Option<String>,
}

/// Repository for Notification database operations
pub struct NotificationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> NotificationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        new_notification: NewNotification,
    ) -> Result<notification::Model, RepositoryError> {
        notification::ActiveModel {
            user_id: Set(new_notification.user_id),
            ticket_id: Set(new_notification.ticket_id),
            title: Set(new_notification.title),
            message: Set(new_notification.message),
            kind: Set(new_notification.kind),
            is_read: Set(false),
            action_url: Set(new_notification.action_url),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Unread notifications for `user_id`, newest first
    pub async fn list_unread(&self, user_id: i32) -> Result<Vec<notification::Model>, RepositoryError> {
        Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every notification attached to a ticket (any recipient)
    pub async fn list_for_ticket(
        &self,
        ticket_id: i32,
    ) -> Result<Vec<notification::Model>, RepositoryError> {
        Notification::find()
            .filter(notification::Column::TicketId.eq(ticket_id))
            .order_by_asc(notification::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Flag one notification as read if it belongs to `user_id`.
    ///
    /// Returns `false` when no such notification exists for that user.
    pub async fn mark_read(&self, id: i32, user_id: i32) -> Result<bool, RepositoryError> {
        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }

    /// Flag every unread notification of `user_id` as read; returns the count
    pub async fn mark_all_read(&self, user_id: i32) -> Result<u64, RepositoryError> {
        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected)
    }
}
