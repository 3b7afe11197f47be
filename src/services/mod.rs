//! # Domain Services
//!
//! Services hold the business rules of the ticketing system: role checks,
//! validation, history and notification side effects, and the transactions
//! that keep them consistent. Handlers translate HTTP to service calls;
//! repositories do the data access.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Role, user};

pub mod admin;
pub mod comments;
pub mod folio;
pub mod notifications;
pub mod reports;
pub mod sessions;
pub mod taxonomy;
pub mod tickets;

pub use admin::AdminService;
pub use comments::CommentService;
pub use notifications::NotificationService;
pub use reports::ReportService;
pub use taxonomy::TaxonomyService;
pub use tickets::TicketService;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Syntactic address check shared by ticket requesters and directory users
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// The authenticated caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
    pub name: String,
}

impl Actor {
    pub fn new(id: i32, role: Role, name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            name: name.into(),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Technicians and admins only
    pub fn require_staff(&self) -> ServiceResult<()> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(ServiceError::forbidden(
                "Only technicians and admins can perform this action",
            ))
        }
    }

    /// Admins only
    pub fn require_admin(&self) -> ServiceResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("Only admins can perform this action"))
        }
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            role: user.role,
            name: user.display_name(),
        }
    }
}
