// ABOUTME: Per-IP fixed-window rate limiting for public endpoints
// ABOUTME: Tracks request counts in memory and enforces submission and chat limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Rate Limiting
//!
//! In-memory fixed-window rate limiting keyed by client IP. Public
//! endpoints (contact form, chat) get separate limits; exceeding either
//! returns 429 without touching the database.

use crate::config::environment::RateLimitConfig;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use http::HeaderMap;

/// A named rate limit rule: at most `limit` requests per `window_secs`
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    /// Rule name used as part of the tracking key and in log output
    pub name: &'static str,
    /// Maximum requests per window
    pub limit: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

/// Tracked client count that triggers opportunistic eviction
const MAX_TRACKED_WINDOWS: usize = 10_000;

#[derive(Debug)]
struct WindowState {
    window_start: DateTime<Utc>,
    count: u32,
}

/// Fixed-window request counter shared across handlers.
///
/// The per-endpoint rules are built once from [`RateLimitConfig`], so the
/// thresholds operators tune through the environment are the ones enforced.
pub struct RateLimiter {
    enabled: bool,
    submission_rule: RateLimitRule,
    chat_rule: RateLimitRule,
    windows: DashMap<String, WindowState>,
}

impl RateLimiter {
    /// Create a rate limiter enforcing the configured per-endpoint rules
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            submission_rule: RateLimitRule {
                name: "submissions",
                limit: config.submission_limit,
                window_secs: config.submission_window_secs,
            },
            chat_rule: RateLimitRule {
                name: "chat",
                limit: config.chat_limit,
                window_secs: config.chat_window_secs,
            },
            windows: DashMap::new(),
        }
    }

    /// Record a contact form submission for `client`.
    ///
    /// # Errors
    ///
    /// Returns a 429 [`AppError`] when the client has exhausted the
    /// window's allowance.
    pub fn check_submission(&self, client: &str) -> AppResult<()> {
        self.check(client, &self.submission_rule)
    }

    /// Record a chat message for `client`.
    ///
    /// # Errors
    ///
    /// Returns a 429 [`AppError`] when the client has exhausted the
    /// window's allowance.
    pub fn check_chat(&self, client: &str) -> AppResult<()> {
        self.check(client, &self.chat_rule)
    }

    fn check(&self, client: &str, rule: &RateLimitRule) -> AppResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let now = Utc::now();
        let window = Duration::seconds(i64::try_from(rule.window_secs).unwrap_or(i64::MAX));
        let key = format!("{}:{client}", rule.name);

        if self.windows.len() > MAX_TRACKED_WINDOWS {
            self.evict_expired();
        }

        let mut entry = self.windows.entry(key).or_insert_with(|| WindowState {
            window_start: now,
            count: 0,
        });

        if now.signed_duration_since(entry.window_start) >= window {
            entry.window_start = now;
            entry.count = 0;
        }

        if entry.count >= rule.limit {
            let reset_at = entry.window_start + window;
            tracing::warn!(
                client = %client,
                rule = rule.name,
                limit = rule.limit,
                "rate limit exceeded, resets at {}",
                reset_at.to_rfc3339()
            );
            return Err(AppError::rate_limited());
        }

        entry.count += 1;
        Ok(())
    }

    /// Drop windows that ended in the past. Called opportunistically so the
    /// map does not grow without bound.
    pub fn evict_expired(&self) {
        let now = Utc::now();
        self.windows.retain(|key, state| {
            let window_secs = if key.starts_with(self.submission_rule.name) {
                self.submission_rule.window_secs
            } else {
                self.chat_rule.window_secs
            };
            let window = Duration::seconds(i64::try_from(window_secs).unwrap_or(i64::MAX));
            now.signed_duration_since(state.window_start) < window
        });
    }
}

/// Resolve the client IP from proxy headers, falling back to "unknown".
///
/// The server is expected to sit behind a reverse proxy that sets
/// `X-Forwarded-For` or `X-Real-IP`.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let trimmed = first.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_owned();
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return trimmed.to_owned();
            }
        }
    }

    "unknown".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn config(submission_limit: u32, chat_limit: u32) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            submission_limit,
            chat_limit,
            ..RateLimitConfig::default()
        }
    }

    #[test]
    fn test_limit_enforced_per_client() {
        let limiter = RateLimiter::new(&config(3, 10));

        for _ in 0..3 {
            assert!(limiter.check_submission("1.2.3.4").is_ok());
        }
        assert!(limiter.check_submission("1.2.3.4").is_err());
        // A different client has its own window
        assert!(limiter.check_submission("5.6.7.8").is_ok());
    }

    #[test]
    fn test_configured_limits_apply() {
        let limiter = RateLimiter::new(&config(1, 10));

        assert!(limiter.check_submission("1.2.3.4").is_ok());
        assert!(limiter.check_submission("1.2.3.4").is_err());
        // Chat has its own rule and window
        assert!(limiter.check_chat("1.2.3.4").is_ok());
    }

    #[test]
    fn test_disabled_limiter_allows_everything() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: false,
            submission_limit: 1,
            ..RateLimitConfig::default()
        });
        for _ in 0..100 {
            assert!(limiter.check_submission("1.2.3.4").is_ok());
        }
    }

    #[test]
    fn test_client_ip_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers), "198.51.100.2");
    }
}
