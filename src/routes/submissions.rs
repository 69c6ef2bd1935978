// ABOUTME: Public contact form intake route
// ABOUTME: Validates submissions, persists them, and dispatches notifications

//! Contact form submission intake.
//!
//! The single public POST endpoint validates the payload, writes the row,
//! fires the best-effort side effects (operator email, auto-reply,
//! audience sync) and answers 201 with the stored row.

use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{NewSubmission, Package, Submission};
use crate::rate_limiting::client_ip;
use crate::sanitize::{is_http_url, is_valid_email};
use crate::server::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Longest accepted business description, in characters
const MAX_DESCRIPTION_CHARS: usize = 100;

/// Incoming contact form payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_description: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub package_other: Option<String>,
    #[serde(default)]
    pub has_existing_website: Option<String>,
    #[serde(default)]
    pub existing_website_url: Option<String>,
}

impl SubmissionRequest {
    /// Validate the payload into an insertable submission
    ///
    /// # Errors
    ///
    /// Returns a 400 [`AppError`] naming the first failing field.
    pub fn validate(self) -> Result<NewSubmission, AppError> {
        let business_name = required_field(self.business_name, "businessName")?;
        let name = required_field(self.name, "name")?;
        let email = required_field(self.email, "email")?;
        let phone = required_field(self.phone, "phone")?;
        let business_description =
            required_field(self.business_description, "businessDescription")?;
        let package_raw = required_field(self.package, "package")?;

        if !is_valid_email(&email) {
            return Err(AppError::invalid_input("Invalid email address"));
        }

        if business_description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::invalid_input(format!(
                "businessDescription must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }

        let package: Package = package_raw
            .parse()
            .map_err(|_| AppError::invalid_input(format!("Unknown package: {package_raw}")))?;

        let existing_website_url = match self.existing_website_url.filter(|u| !u.trim().is_empty())
        {
            Some(url) => {
                let url = url.trim().to_owned();
                if !is_http_url(&url) {
                    return Err(AppError::invalid_input(
                        "existingWebsiteUrl must be an http or https URL",
                    ));
                }
                Some(url)
            }
            None => None,
        };

        Ok(NewSubmission {
            business_name,
            name,
            email,
            phone,
            business_description,
            package,
            package_other: self.package_other.filter(|s| !s.trim().is_empty()),
            has_existing_website: self.has_existing_website.filter(|s| !s.trim().is_empty()),
            existing_website_url,
        })
    }
}

fn required_field(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(AppError::missing_field(field)),
    }
}

/// Submission routes implementation
pub struct SubmissionRoutes;

impl SubmissionRoutes {
    /// Create the public submission routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/submissions", post(Self::create_submission))
            .with_state(resources)
    }

    async fn create_submission(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<SubmissionRequest>,
    ) -> Result<Response, AppError> {
        resources
            .rate_limiter
            .check_submission(&client_ip(&headers))?;

        let new_submission = request.validate()?;

        let id = resources.database.create_submission(&new_submission).await?;

        // Side effects run off the request path; their failures are logged
        // and never surface here.
        resources.side_effects.on_submission(&new_submission);

        tracing::info!(id, business = %new_submission.business_name, "submission created");

        let stored: Submission = resources
            .database
            .get_submission(id)
            .await?
            .ok_or_else(|| AppError::internal("submission vanished after insert"))?;

        Ok((StatusCode::CREATED, Json(stored)).into_response())
    }
}
