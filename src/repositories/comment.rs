//! # Comment Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

use crate::error::RepositoryError;
use crate::models::{ticket_comment, user, TicketComment};

/// Data required to insert a comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub ticket_id: i32,
    pub user_id: i32,
    pub content: String,
    pub attachment_url: Option<String>,
    pub attachment_name: Option<String>,
    pub is_internal: bool,
}

/// Repository for TicketComment database operations
pub struct CommentRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CommentRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn insert(&self, new_comment: NewComment) -> Result<ticket_comment::Model, RepositoryError> {
        let now = Utc::now();
        ticket_comment::ActiveModel {
            ticket_id: Set(new_comment.ticket_id),
            user_id: Set(new_comment.user_id),
            content: Set(new_comment.content),
            attachment_url: Set(new_comment.attachment_url),
            attachment_name: Set(new_comment.attachment_name),
            is_internal: Set(new_comment.is_internal),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ticket_comment::Model>, RepositoryError> {
        TicketComment::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Comments on a ticket with their authors, newest first.
    ///
    /// Internal comments are filtered out unless `include_internal` is set.
    pub async fn list_for_ticket(
        &self,
        ticket_id: i32,
        include_internal: bool,
    ) -> Result<Vec<(ticket_comment::Model, Option<user::Model>)>, RepositoryError> {
        let mut query = TicketComment::find()
            .find_also_related(user::Entity)
            .filter(ticket_comment::Column::TicketId.eq(ticket_id));

        if !include_internal {
            query = query.filter(ticket_comment::Column::IsInternal.eq(false));
        }

        query
            .order_by_desc(ticket_comment::Column::CreatedAt)
            .order_by_desc(ticket_comment::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update_content(
        &self,
        id: i32,
        content: String,
    ) -> Result<ticket_comment::Model, RepositoryError> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Comment {id}")))?;

        let mut active = existing.into_active_model();
        active.content = Set(content);
        active.updated_at = Set(Utc::now());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Returns `true` when a row was removed
    pub async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let result = TicketComment::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected > 0)
    }
}
