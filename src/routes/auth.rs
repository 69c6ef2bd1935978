// ABOUTME: Admin login route issuing bearer tokens
// ABOUTME: Verifies credentials against bcrypt hashes without user enumeration

//! Admin login.
//!
//! A missing user and a wrong password both answer the same generic 401
//! so the endpoint cannot be used to enumerate usernames.

use crate::auth::verify_password;
use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::server::ServerResources;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Auth routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the login route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/login", post(Self::login))
            .with_state(resources)
    }

    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Json<LoginResponse>, AppError> {
        let user = resources
            .database
            .get_admin_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid credentials"))?;

        let password_ok = verify_password(&request.password, &user.password_hash)
            .map_err(|e| AppError::internal(format!("password verification failed: {e}")))?;

        if !password_ok {
            tracing::warn!(username = %request.username, "failed login attempt");
            return Err(AppError::auth_invalid("Invalid credentials"));
        }

        let token = resources
            .auth_manager
            .generate_token(&user)
            .map_err(|e| AppError::internal(format!("token generation failed: {e}")))?;

        tracing::info!(username = %user.username, "admin logged in");

        Ok(Json(LoginResponse {
            token,
            username: user.username,
        }))
    }
}
