// ABOUTME: Main library entry point for the Leadbox marketing-site backend
// ABOUTME: Lead intake, operator notification, audience sync, and admin triage
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Leadbox
//!
//! The backend for a marketing website: accepts contact-form submissions
//! and chat messages, persists them, notifies an operator by email, syncs
//! leads to an email-marketing list, and exposes an authenticated admin
//! API for triage.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers per domain (submissions, chat, auth, admin)
//! - **Database plugins**: one provider trait over SQLite and PostgreSQL
//! - **Notifications**: best-effort email and audience sync, fired off the
//!   request path
//! - **Config**: environment-driven settings for deployment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leadbox::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT authentication and password hashing
pub mod auth;
/// Environment-driven configuration
pub mod config;
/// Database abstraction with SQLite and PostgreSQL backends
pub mod database_plugins;
/// Error taxonomy and HTTP error responses
pub mod errors;
/// Logging configuration
pub mod logging;
/// HTTP middleware (bearer auth, CORS)
pub mod middleware;
/// Domain models
pub mod models;
/// Best-effort email and audience-sync side effects
pub mod notifications;
/// Per-IP fixed-window rate limiting
pub mod rate_limiting;
/// Route handlers grouped by domain
pub mod routes;
/// Input sanitization and validation helpers
pub mod sanitize;
/// Server resources and HTTP server assembly
pub mod server;
