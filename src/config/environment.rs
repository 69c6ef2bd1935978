// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment type controlling error verbosity and log format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Process-level production check for code paths without access to config
/// (error rendering). Reads `ENVIRONMENT` directly.
#[must_use]
pub fn is_production() -> bool {
    env::var("ENVIRONMENT")
        .map(|v| Environment::from_str_or_default(&v).is_production())
        .unwrap_or(false)
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite { path: PathBuf },
    /// PostgreSQL connection
    PostgreSQL { connection_string: String },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            if path_str == ":memory:" {
                Self::Memory
            } else {
                Self::SQLite {
                    path: PathBuf::from(path_str),
                }
            }
        } else if s.starts_with("postgresql://") || s.starts_with("postgres://") {
            Self::PostgreSQL {
                connection_string: s.to_owned(),
            }
        } else {
            // Fallback: treat as a SQLite file path
            Self::SQLite {
                path: PathBuf::from(s),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::PostgreSQL { connection_string } => connection_string.clone(),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/leadbox.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,
    /// Token expiry in hours (default 168 = 7 days)
    pub jwt_expiry_hours: i64,
}

/// Admin bootstrap credentials, seeded idempotently at startup
#[derive(Debug, Clone)]
pub struct AdminBootstrapConfig {
    pub username: String,
    /// Plaintext password to hash at boot; ignored when a hash is provided
    pub password: Option<String>,
    /// Pre-computed bcrypt hash
    pub password_hash: Option<String>,
    pub email: Option<String>,
}

/// SMTP relay configuration. When `smtp_host` is unset, emails are written
/// to `file_dir` instead (development mode); when neither is set the
/// notifier is disabled entirely.
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    /// Operator address that receives new-lead notifications
    pub operator_email: Option<String>,
    /// Directory for the development file transport
    pub file_dir: Option<PathBuf>,
}

impl EmailConfig {
    /// True when no transport is configured at all
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.smtp_host.is_none() && self.file_dir.is_none()
    }
}

/// Email-marketing audience sync configuration
#[derive(Debug, Clone, Default)]
pub struct AudienceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub list_id: String,
}

impl AudienceConfig {
    /// Sync is skipped entirely without an API key
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Per-IP fixed-window rate limit settings
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Submissions: requests per window
    pub submission_limit: u32,
    /// Submissions window in seconds (default 15 minutes)
    pub submission_window_secs: u64,
    /// Chat messages: requests per window
    pub chat_limit: u32,
    /// Chat window in seconds (default 1 minute)
    pub chat_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            submission_limit: 5,
            submission_window_secs: 15 * 60,
            chat_limit: 10,
            chat_window_secs: 60,
        }
    }
}

/// Top-level server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Deployment environment
    pub environment: Environment,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Admin bootstrap credentials
    pub admin: AdminBootstrapConfig,
    /// Email notification settings
    pub email: EmailConfig,
    /// Audience sync settings
    pub audience: AudienceConfig,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
    /// Comma-separated CORS origin list; empty or "*" means any origin
    pub cors_allowed_origins: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing, or if a numeric
    /// variable fails to parse.
    pub fn from_env() -> Result<Self> {
        let http_port = parse_env("HTTP_PORT", 8080)?;
        let database_url = DatabaseUrl::parse_url(
            &env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/leadbox.db".to_owned()),
        );
        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_owned()),
        );

        let auth = AuthConfig {
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set to sign admin bearer tokens")?,
            jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", 168)?,
        };

        let admin = AdminBootstrapConfig {
            username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_owned()),
            password: env::var("ADMIN_PASSWORD").ok(),
            password_hash: env::var("ADMIN_PASSWORD_HASH").ok(),
            email: env::var("ADMIN_EMAIL").ok(),
        };

        let email = EmailConfig {
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: parse_env("SMTP_PORT", 587)?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("EMAIL_FROM").unwrap_or_else(|_| "no-reply@localhost".to_owned()),
            from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Leadbox".to_owned()),
            operator_email: env::var("OPERATOR_EMAIL").ok(),
            file_dir: env::var("EMAIL_FILE_DIR").ok().map(PathBuf::from),
        };

        let audience = AudienceConfig {
            api_key: env::var("AUDIENCE_API_KEY").ok(),
            base_url: env::var("AUDIENCE_BASE_URL").unwrap_or_default(),
            list_id: env::var("AUDIENCE_LIST_ID").unwrap_or_default(),
        };

        let rate_limit = RateLimitConfig {
            enabled: env::var("RATE_LIMIT_ENABLED").map_or(true, |v| v != "false" && v != "0"),
            ..RateLimitConfig::default()
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

        Ok(Self {
            http_port,
            database_url,
            environment,
            auth,
            admin,
            email,
            audience,
            rate_limit,
            cors_allowed_origins,
        })
    }

    /// One-line summary for startup logging (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} db={} env={} email={} audience_sync={} rate_limit={}",
            self.http_port,
            self.database_url,
            self.environment,
            if self.email.is_disabled() {
                "disabled"
            } else if self.email.smtp_host.is_some() {
                "smtp"
            } else {
                "file"
            },
            self.audience.is_enabled(),
            self.rate_limit.enabled,
        )
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("invalid value for {name}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert!(matches!(
            DatabaseUrl::parse_url("sqlite::memory:"),
            DatabaseUrl::Memory
        ));
        assert!(matches!(
            DatabaseUrl::parse_url("sqlite:./leads.db"),
            DatabaseUrl::SQLite { .. }
        ));
        assert!(matches!(
            DatabaseUrl::parse_url("postgresql://u:p@host/db"),
            DatabaseUrl::PostgreSQL { .. }
        ));
        // Bare paths fall back to SQLite
        assert!(matches!(
            DatabaseUrl::parse_url("./leads.db"),
            DatabaseUrl::SQLite { .. }
        ));
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("prod"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("unknown"),
            Environment::Development
        );
    }

    #[test]
    fn test_rate_limit_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.submission_limit, 5);
        assert_eq!(config.submission_window_secs, 900);
        assert_eq!(config.chat_limit, 10);
        assert_eq!(config.chat_window_secs, 60);
    }
}
