//! # Servyre IT
//!
//! Backend for a role-based IT support desk: tickets with per-branch folios,
//! comment threads with attachments, change history, per-user notifications,
//! taxonomy administration and monthly PDF reports.

pub mod attachments;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pdf;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod services;
pub mod telemetry;
pub use migration;
