//! Database seeding functionality
//!
//! Seeds the default ticket taxonomy (statuses, priorities, departments) the
//! first time the service starts against an empty database. Seeding is
//! idempotent: existing rows are matched by name and left untouched.

pub mod taxonomy;

pub use taxonomy::{seed_defaults, seed_departments, seed_priorities, seed_statuses};
