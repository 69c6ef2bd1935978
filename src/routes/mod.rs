// ABOUTME: Route module organization for the lead intake HTTP API
// ABOUTME: Groups route definitions by domain with thin handlers over the service layer

//! Route modules for the HTTP API
//!
//! Each domain module contains route definitions and thin handler
//! functions that delegate to the database and notification layers.

/// Admin triage routes (submissions, chat overview, stats)
pub mod admin;
/// Admin login route
pub mod auth;
/// Public chat message intake routes
pub mod chat;
/// Health check routes
pub mod health;
/// Public contact form intake routes
pub mod submissions;

pub use admin::AdminRoutes;
pub use auth::AuthRoutes;
pub use chat::ChatRoutes;
pub use health::HealthRoutes;
pub use submissions::SubmissionRoutes;
