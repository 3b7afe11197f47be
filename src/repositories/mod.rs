//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations. Every repository is generic over [`sea_orm::ConnectionTrait`]
//! so it can run on the pool or on a transaction handle.

pub mod comment;
pub mod folio;
pub mod history;
pub mod notification;
pub mod taxonomy;
pub mod ticket;
pub mod user;

pub use comment::{CommentRepository, NewComment};
pub use folio::FolioCounterRepository;
pub use history::{HistoryRepository, NewHistoryEntry};
pub use notification::{NewNotification, NotificationRepository};
pub use taxonomy::TaxonomyRepository;
pub use ticket::{NewTicket, TicketRepository};
pub use user::{NewUser, UserChanges, UserRepository};
