// ABOUTME: HTTP middleware for admin authentication and cross-origin access
// ABOUTME: Bearer token validation and CORS layer construction

pub mod auth;
pub mod cors;

pub use auth::AdminAuthMiddleware;
pub use cors::setup_cors;
