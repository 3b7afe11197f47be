//! # Data Models
//!
//! This module contains the SeaORM entities used throughout the Servyre IT
//! ticketing service, plus their API response representations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod category;
pub mod category_failure;
pub mod department;
pub mod folio_counter;
pub mod notification;
pub mod priority;
pub mod ticket;
pub mod ticket_comment;
pub mod ticket_history;
pub mod ticket_status;
pub mod user;

pub use category::Entity as Category;
pub use category_failure::Entity as CategoryFailure;
pub use department::Entity as Department;
pub use folio_counter::Entity as FolioCounter;
pub use notification::Entity as Notification;
pub use priority::Entity as Priority;
pub use ticket::Entity as Ticket;
pub use ticket_comment::Entity as TicketComment;
pub use ticket_history::Entity as TicketHistory;
pub use ticket_status::Entity as TicketStatus;
pub use user::Entity as User;

pub use notification::NotificationType;
pub use ticket::Branch;
pub use ticket_history::ChangeType;
pub use user::Role;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "servyre-it".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
