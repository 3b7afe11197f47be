//! # History Repository
//!
//! Append-only access to the ticket audit trail.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::error::RepositoryError;
use crate::models::{ticket_history, ChangeType, TicketHistory};

/// Data required to append a history entry
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub ticket_id: i32,
    pub changed_by_user_id: i32,
    pub field_name: String,
    pub change_type: ChangeType,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub description: Option<String>,
}

/// Repository for TicketHistory database operations
pub struct HistoryRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> HistoryRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn append(&self, entry: NewHistoryEntry) -> Result<ticket_history::Model, RepositoryError> {
        ticket_history::ActiveModel {
            ticket_id: Set(entry.ticket_id),
            changed_by_user_id: Set(entry.changed_by_user_id),
            field_name: Set(entry.field_name),
            change_type: Set(entry.change_type),
            old_value: Set(entry.old_value),
            new_value: Set(entry.new_value),
            description: Set(entry.description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Entries for a ticket in the order they were written
    pub async fn list_for_ticket(
        &self,
        ticket_id: i32,
    ) -> Result<Vec<ticket_history::Model>, RepositoryError> {
        TicketHistory::find()
            .filter(ticket_history::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_history::Column::CreatedAt)
            .order_by_asc(ticket_history::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
