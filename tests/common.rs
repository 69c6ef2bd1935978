// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, resource, and router construction helpers
#![allow(dead_code, clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Shared test utilities for `leadbox`

use anyhow::Result;
use axum::Router;
use leadbox::{
    auth::hash_password,
    config::environment::{
        AdminBootstrapConfig, AudienceConfig, AuthConfig, DatabaseUrl, EmailConfig, Environment,
        RateLimitConfig, ServerConfig,
    },
    database_plugins::{factory::Database, DatabaseProvider},
    notifications::SideEffects,
    server::{build_router, ServerResources},
};
use std::sync::{Arc, Once};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test configuration with notifications disabled
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: DatabaseUrl::Memory,
        environment: Environment::Testing,
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".into(),
            jwt_expiry_hours: 24,
        },
        admin: AdminBootstrapConfig {
            username: "admin".into(),
            password: Some("correct horse".into()),
            password_hash: None,
            email: None,
        },
        email: EmailConfig::default(),
        audience: AudienceConfig::default(),
        rate_limit: RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        },
        cors_allowed_origins: String::new(),
    }
}

/// Standard in-memory test database with schema applied
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    database.migrate().await?;
    Ok(database)
}

/// Full resource container for router-level tests
pub async fn create_test_resources(config: ServerConfig) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    Ok(Arc::new(ServerResources::new(
        database,
        Arc::new(config),
        SideEffects::disabled(),
    )))
}

/// Router plus resources for request-level tests
pub async fn create_test_app() -> Result<(Router, Arc<ServerResources>)> {
    let resources = create_test_resources(test_config()).await?;
    Ok((build_router(Arc::clone(&resources)), resources))
}

/// Seed the configured admin user and return the matching password
pub async fn seed_admin(resources: &ServerResources) -> Result<String> {
    let password = "correct horse";
    let hash = hash_password(password)?;
    resources
        .database
        .create_admin_user("admin", &hash, None)
        .await?;
    Ok(password.to_owned())
}
