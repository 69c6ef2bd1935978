// ABOUTME: Admin authentication middleware for bearer token validation
// ABOUTME: Extracts and validates JWT tokens from Authorization headers

use crate::auth::{AuthManager, Claims, JwtValidationError};
use crate::errors::{AppError, AppResult};
use std::sync::Arc;

/// Middleware for admin endpoint authentication.
///
/// Missing or non-Bearer Authorization headers map to 401; a token that
/// is present but expired, malformed, or wrongly signed maps to 403.
#[derive(Clone)]
pub struct AdminAuthMiddleware {
    auth_manager: Arc<AuthManager>,
}

impl AdminAuthMiddleware {
    /// Create new admin auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>) -> Self {
        Self { auth_manager }
    }

    /// Authenticate a request from its headers
    ///
    /// # Errors
    ///
    /// Returns an error if the Authorization header is missing, is not a
    /// Bearer scheme, or carries an invalid or expired token.
    pub fn authenticate_request(&self, headers: &axum::http::HeaderMap) -> AppResult<Claims> {
        let auth_header = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must use Bearer scheme"))?;

        match self.auth_manager.validate_token_detailed(token) {
            Ok(claims) => {
                tracing::debug!(admin = %claims.username, "admin request authenticated");
                Ok(claims)
            }
            Err(JwtValidationError::TokenExpired { .. }) => Err(AppError::token_expired()),
            Err(e) => Err(AppError::token_invalid(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::AdminUser;
    use axum::http::{HeaderMap, HeaderValue};
    use chrono::Utc;

    fn middleware(expiry_hours: i64) -> (AdminAuthMiddleware, String) {
        let manager = Arc::new(AuthManager::new(b"test-secret", expiry_hours));
        let user = AdminUser {
            id: 1,
            username: "admin".into(),
            password_hash: "unused".into(),
            email: None,
            created_at: Utc::now(),
        };
        let token = manager.generate_token(&user).unwrap();
        (AdminAuthMiddleware::new(manager), token)
    }

    #[test]
    fn test_valid_bearer_token_accepted() {
        let (mw, token) = middleware(24);
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        let claims = mw.authenticate_request(&headers).unwrap();
        assert_eq!(claims.username, "admin");
    }

    #[test]
    fn test_missing_header_is_auth_required() {
        let (mw, _) = middleware(24);
        let err = mw.authenticate_request(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[test]
    fn test_non_bearer_scheme_is_auth_invalid() {
        let (mw, _) = middleware(24);
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        let err = mw.authenticate_request(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_expired_token_is_token_expired() {
        let (mw, token) = middleware(-1);
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        let err = mw.authenticate_request(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn test_garbage_token_is_token_invalid() {
        let (mw, _) = middleware(24);
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer garbage"));
        let err = mw.authenticate_request(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }
}
