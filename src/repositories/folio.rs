//! # Folio Counter Repository
//!
//! Access to the single-row folio sequence. Callers must hold a transaction
//! for the read-advance pair to be atomic.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbBackend, EntityTrait, QuerySelect, Set};

use crate::error::RepositoryError;
use crate::models::folio_counter::{self, FOLIO_COUNTER_ID};
use crate::models::FolioCounter;

/// Repository for the folio counter row
pub struct FolioCounterRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> FolioCounterRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Read the counter row, taking a row lock where the backend supports it.
    ///
    /// Returns `None` if the counter has never been initialized.
    pub async fn lock_current(&self) -> Result<Option<folio_counter::Model>, RepositoryError> {
        let mut query = FolioCounter::find_by_id(FOLIO_COUNTER_ID);
        if self.db.get_database_backend() != DbBackend::Sqlite {
            query = query.lock_exclusive();
        }

        query
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Store `next_value` as the next number to hand out, creating the row on first use
    pub async fn store_next(
        &self,
        existing: Option<folio_counter::Model>,
        next_value: i64,
    ) -> Result<folio_counter::Model, RepositoryError> {
        let now = Utc::now();
        match existing {
            Some(model) => {
                let mut active: folio_counter::ActiveModel = model.into();
                active.next_value = Set(next_value);
                active.updated_at = Set(now);
                active.update(self.db).await
            }
            None => {
                folio_counter::ActiveModel {
                    id: Set(FOLIO_COUNTER_ID),
                    next_value: Set(next_value),
                    updated_at: Set(now),
                }
                .insert(self.db)
                .await
            }
        }
        .map_err(RepositoryError::database_error)
    }
}
