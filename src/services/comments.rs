//! Comments and attachments on tickets.

use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attachments::{AttachmentStore, AttachmentUpload};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{ticket_comment, user, ChangeType, Role};
use crate::repositories::{
    CommentRepository, HistoryRepository, NewComment, NewHistoryEntry, TicketRepository,
    UserRepository,
};

use super::tickets::can_access;
use super::{notifications, Actor};

/// Input for [`CommentService::add_comment`]
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentInput {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub attachment: Option<AttachmentUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComment {
    pub comment_id: i32,
}

/// Comment as shown in a ticket thread
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i32,
    pub ticket_id: i32,
    pub user_id: i32,
    pub content: String,
    pub attachment_url: Option<String>,
    pub attachment_name: Option<String>,
    pub is_internal: bool,
    #[schema(value_type = String)]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[schema(value_type = String)]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub author_name: String,
    pub author_role: Option<Role>,
}

impl CommentView {
    fn new(comment: ticket_comment::Model, author: Option<user::Model>) -> Self {
        let author_name = author
            .as_ref()
            .map(user::Model::display_name)
            .unwrap_or_else(|| format!("Usuario #{}", comment.user_id));

        Self {
            id: comment.id,
            ticket_id: comment.ticket_id,
            user_id: comment.user_id,
            content: comment.content,
            attachment_url: comment.attachment_url,
            attachment_name: comment.attachment_name,
            is_internal: comment.is_internal,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            author_name,
            author_role: author.map(|a| a.role),
        }
    }
}

pub struct CommentService<'a> {
    db: &'a DatabaseConnection,
    attachments: &'a dyn AttachmentStore,
}

impl<'a> CommentService<'a> {
    pub fn new(db: &'a DatabaseConnection, attachments: &'a dyn AttachmentStore) -> Self {
        Self { db, attachments }
    }

    /// Add a comment, an attachment, or both to a ticket.
    ///
    /// The file is stored before any row is written; a storage failure aborts
    /// the whole operation.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        ticket_id: i32,
        input: AddCommentInput,
    ) -> ServiceResult<CreatedComment> {
        let content = input
            .content
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if content.is_empty() && input.attachment.is_none() {
            return Err(ServiceError::bad_request(
                "A comment needs text or an attachment",
            ));
        }

        let ticket = TicketRepository::new(self.db)
            .find_by_id(ticket_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Ticket {ticket_id} not found")))?;

        if !can_access(actor, &ticket) {
            return Err(ServiceError::forbidden("You do not have access to this ticket"));
        }
        if input.is_internal && !actor.is_staff() {
            return Err(ServiceError::forbidden(
                "Only technicians and admins can add internal comments",
            ));
        }

        let stored = match &input.attachment {
            Some(upload) => Some(self.attachments.store(upload).await?),
            None => None,
        };

        let txn = self.db.begin().await?;

        let comment = CommentRepository::new(&txn)
            .insert(NewComment {
                ticket_id,
                user_id: actor.id,
                content,
                attachment_url: stored.as_ref().map(|s| s.url.clone()),
                attachment_name: stored.as_ref().map(|s| s.name.clone()),
                is_internal: input.is_internal,
            })
            .await?;

        let description = if stored.is_some() {
            "Comentario con archivo adjunto"
        } else if comment.is_internal {
            "Comentario interno agregado"
        } else {
            "Comentario agregado"
        };
        let history_entry = NewHistoryEntry {
            ticket_id,
            changed_by_user_id: actor.id,
            field_name: "comment".to_string(),
            change_type: ChangeType::CommentAdded,
            old_value: None,
            new_value: stored.as_ref().map(|file| file.name.clone()),
            description: Some(description.to_string()),
        };
        HistoryRepository::new(&txn).append(history_entry).await?;

        if !comment.is_internal {
            notifications::notify_comment_added(&txn, &ticket, &actor.name).await?;
        }

        txn.commit().await?;

        counter!(
            "comments_added_total",
            "internal" => comment.is_internal.to_string(),
            "attachment" => stored.is_some().to_string()
        )
        .increment(1);
        tracing::info!(
            ticket_id,
            comment_id = comment.id,
            author = actor.id,
            internal = comment.is_internal,
            attachment = stored.is_some(),
            "Comment added"
        );

        Ok(CreatedComment {
            comment_id: comment.id,
        })
    }

    /// Replace a comment's text (admin only).
    ///
    /// The text may only end up empty when the comment carries an attachment.
    pub async fn update_comment(
        &self,
        actor: &Actor,
        comment_id: i32,
        content: String,
    ) -> ServiceResult<CommentView> {
        actor.require_admin()?;

        let comments = CommentRepository::new(self.db);
        let existing = comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Comment {comment_id} not found")))?;

        let content = content.trim().to_string();
        if content.is_empty() && existing.attachment_url.is_none() {
            return Err(ServiceError::bad_request(
                "A comment without an attachment needs text",
            ));
        }

        let updated = comments.update_content(comment_id, content).await?;
        let author = UserRepository::new(self.db).find_by_id(updated.user_id).await?;

        tracing::info!(comment_id, edited_by = actor.id, "Comment edited");
        Ok(CommentView::new(updated, author))
    }

    /// Remove a comment (admin only)
    pub async fn delete_comment(&self, actor: &Actor, comment_id: i32) -> ServiceResult<()> {
        actor.require_admin()?;

        if !CommentRepository::new(self.db).delete(comment_id).await? {
            return Err(ServiceError::not_found(format!("Comment {comment_id} not found")));
        }

        tracing::info!(comment_id, deleted_by = actor.id, "Comment deleted");
        Ok(())
    }

    /// Thread for a ticket, newest first.
    ///
    /// Internal comments are only included for staff. A missing ticket or one
    /// the caller cannot see yields an empty list.
    pub async fn get_comments(&self, actor: &Actor, ticket_id: i32) -> ServiceResult<Vec<CommentView>> {
        let Some(ticket) = TicketRepository::new(self.db).find_by_id(ticket_id).await? else {
            return Ok(Vec::new());
        };
        if !can_access(actor, &ticket) {
            return Ok(Vec::new());
        }

        let rows = CommentRepository::new(self.db)
            .list_for_ticket(ticket_id, actor.is_staff())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentView::new(comment, author))
            .collect())
    }
}
