// ABOUTME: Shared server resources and HTTP server assembly
// ABOUTME: Builds the axum router, wires middleware, and runs the listener

//! # Server assembly
//!
//! [`ServerResources`] is the dependency container shared by every route
//! handler. [`run_server`] binds the listener and serves until ctrl-c.

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppResult;
use crate::middleware::{setup_cors, AdminAuthMiddleware};
use crate::notifications::{AudienceClient, EmailNotifier, SideEffects};
use crate::rate_limiting::RateLimiter;
use crate::routes::{AdminRoutes, AuthRoutes, ChatRoutes, HealthRoutes, SubmissionRoutes};
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Centralized resource container for dependency injection
///
/// Holds all shared server state so handlers never rebuild expensive
/// objects per request.
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub auth_middleware: AdminAuthMiddleware,
    pub side_effects: SideEffects,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>, side_effects: SideEffects) -> Self {
        let auth_manager = Arc::new(AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        ));

        Self {
            database: Arc::new(database),
            auth_manager: Arc::clone(&auth_manager),
            auth_middleware: AdminAuthMiddleware::new(auth_manager),
            side_effects,
            rate_limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            config,
        }
    }

    /// Build the side effect dispatcher from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the email or audience clients cannot be built.
    pub fn build_side_effects(config: &ServerConfig) -> AppResult<SideEffects> {
        let email = EmailNotifier::from_config(&config.email)?;
        let audience = AudienceClient::from_config(&config.audience)?;

        if email.is_none() {
            tracing::warn!("no email transport configured, notifications disabled");
        }
        if audience.is_none() {
            tracing::info!("no audience API key configured, audience sync disabled");
        }

        Ok(SideEffects::new(email, audience))
    }
}

/// Assemble the full application router
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config.cors_allowed_origins);

    Router::new()
        .merge(HealthRoutes::routes())
        .merge(SubmissionRoutes::routes(Arc::clone(&resources)))
        .merge(ChatRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(AdminRoutes::routes(resources))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Seed the admin user from configuration if it does not already exist.
///
/// # Errors
///
/// Returns an error if password hashing or the insert fails, or if
/// neither a password nor a password hash is configured.
pub async fn ensure_admin_user(database: &Database, config: &ServerConfig) -> Result<()> {
    let admin = &config.admin;

    let password_hash = match (&admin.password_hash, &admin.password) {
        (Some(hash), _) => hash.clone(),
        (None, Some(password)) => crate::auth::hash_password(password)?,
        (None, None) => {
            anyhow::bail!(
                "set ADMIN_PASSWORD or ADMIN_PASSWORD_HASH to bootstrap the admin account"
            )
        }
    };

    let created = database
        .create_admin_user(&admin.username, &password_hash, admin.email.as_deref())
        .await?;

    if created {
        info!(username = %admin.username, "admin user created");
    } else {
        info!(username = %admin.username, "admin user already exists");
    }

    Ok(())
}

/// Bind the HTTP listener and serve until shutdown
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails.
pub async fn run_server(resources: Arc<ServerResources>) -> Result<()> {
    let port = resources.config.http_port;
    let app = build_router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;

    info!("HTTP server listening on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
        return;
    }
    info!("shutdown signal received");
}
