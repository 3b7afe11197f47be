//! # Ticket Repository
//!
//! Data access for tickets. Multi-row operations (creation with history and
//! notifications, cascade deletion) are expected to run on a transaction
//! handle passed in as the connection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use sea_orm::{ActiveValue::Set, sea_query::Expr};

use crate::error::RepositoryError;
use crate::models::{
    notification, ticket, ticket_comment, ticket_history, Branch, Notification, Ticket,
    TicketComment, TicketHistory,
};

/// Data required to insert a ticket
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub branch: Branch,
    pub folio: String,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category_id: i32,
    pub status_id: i32,
    pub priority_id: i32,
    pub department_id: i32,
    pub created_by_user_id: i32,
    pub user_name: String,
    pub user_email: String,
}

/// Row counts removed by [`TicketRepository::delete_with_dependents`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedRows {
    pub comments: u64,
    pub history: u64,
    pub notifications: u64,
    pub tickets: u64,
}

/// Repository for Ticket database operations
pub struct TicketRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TicketRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn insert(&self, new_ticket: NewTicket) -> Result<ticket::Model, RepositoryError> {
        let now = Utc::now();
        ticket::ActiveModel {
            branch: Set(new_ticket.branch),
            folio: Set(new_ticket.folio),
            ticket_number: Set(new_ticket.ticket_number),
            title: Set(new_ticket.title),
            description: Set(new_ticket.description),
            category_id: Set(new_ticket.category_id),
            status_id: Set(new_ticket.status_id),
            priority_id: Set(new_ticket.priority_id),
            department_id: Set(new_ticket.department_id),
            created_by_user_id: Set(new_ticket.created_by_user_id),
            assigned_to_user_id: Set(None),
            user_name: Set(new_ticket.user_name),
            user_email: Set(new_ticket.user_email),
            technical_report: Set(None),
            resolution_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            resolved_at: Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ticket::Model>, RepositoryError> {
        Ticket::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Persist changes made to an active model
    pub async fn save(&self, active: ticket::ActiveModel) -> Result<ticket::Model, RepositoryError> {
        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Tickets created by `user_id`, newest first
    pub async fn list_by_creator(&self, user_id: i32) -> Result<Vec<ticket::Model>, RepositoryError> {
        Ticket::find()
            .filter(ticket::Column::CreatedByUserId.eq(user_id))
            .order_by_desc(ticket::Column::CreatedAt)
            .order_by_desc(ticket::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every ticket, newest first
    pub async fn list_all(&self) -> Result<Vec<ticket::Model>, RepositoryError> {
        Ticket::find()
            .order_by_desc(ticket::Column::CreatedAt)
            .order_by_desc(ticket::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Tickets whose `created_at` lies in `[start, end)`
    pub async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ticket::Model>, RepositoryError> {
        Ticket::find()
            .filter(ticket::Column::CreatedAt.gte(start))
            .filter(ticket::Column::CreatedAt.lt(end))
            .order_by_asc(ticket::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every folio string currently stored
    pub async fn all_folios(&self) -> Result<Vec<String>, RepositoryError> {
        Ticket::find()
            .select_only()
            .column(ticket::Column::Folio)
            .into_tuple::<String>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn count_all(&self) -> Result<u64, RepositoryError> {
        Ticket::find()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn count_resolved(&self) -> Result<u64, RepositoryError> {
        Ticket::find()
            .filter(ticket::Column::ResolvedAt.is_not_null())
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Number of comments per ticket for the given ids (tickets without
    /// comments are absent from the map)
    pub async fn comment_counts(
        &self,
        ticket_ids: &[i32],
    ) -> Result<HashMap<i32, i64>, RepositoryError> {
        if ticket_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = TicketComment::find()
            .select_only()
            .column(ticket_comment::Column::TicketId)
            .column_as(Expr::col(ticket_comment::Column::Id).count(), "comment_count")
            .filter(ticket_comment::Column::TicketId.is_in(ticket_ids.iter().copied()))
            .group_by(ticket_comment::Column::TicketId)
            .into_tuple::<(i32, i64)>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows.into_iter().collect())
    }

    /// Remove a ticket together with its comments, history and notifications.
    ///
    /// Must run inside a transaction so a failure leaves nothing half-deleted.
    pub async fn delete_with_dependents(&self, id: i32) -> Result<DeletedRows, RepositoryError> {
        let comments = TicketComment::delete_many()
            .filter(ticket_comment::Column::TicketId.eq(id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .rows_affected;

        let history = TicketHistory::delete_many()
            .filter(ticket_history::Column::TicketId.eq(id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .rows_affected;

        let notifications = Notification::delete_many()
            .filter(notification::Column::TicketId.eq(id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .rows_affected;

        let tickets = Ticket::delete_by_id(id)
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .rows_affected;

        Ok(DeletedRows {
            comments,
            history,
            notifications,
            tickets,
        })
    }
}
