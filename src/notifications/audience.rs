// ABOUTME: Audience sync client for the email-marketing platform
// ABOUTME: Upserts leads as list members with sanitized merge fields and a source tag

//! Audience sync client.
//!
//! Upserts a contact into the configured marketing list keyed by email
//! address, so repeat submitters are updated rather than duplicated.
//! Merge fields carry sanitized values only: free text has diacritics
//! folded and punctuation stripped, phone keeps digits only, the website
//! URL is dropped unless its scheme is http or https.

use crate::config::environment::AudienceConfig;
use crate::errors::{AppError, AppResult};
use crate::models::NewSubmission;
use crate::sanitize::{sanitize_phone, sanitize_text, sanitize_url};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// A contact to upsert into the audience list
#[derive(Debug, Clone)]
pub struct AudienceContact {
    pub email: String,
    pub name: String,
    pub business_name: String,
    pub phone: String,
    pub website: Option<String>,
    pub package: Option<String>,
}

impl AudienceContact {
    /// Build a contact from a validated submission, sanitizing every
    /// merge field.
    #[must_use]
    pub fn from_submission(submission: &NewSubmission) -> Self {
        Self {
            email: submission.email.clone(),
            name: sanitize_text(&submission.name),
            business_name: sanitize_text(&submission.business_name),
            phone: sanitize_phone(&submission.phone),
            website: submission
                .existing_website_url
                .as_deref()
                .and_then(sanitize_url)
                .map(str::to_owned),
            package: Some(submission.package.as_str().to_owned()),
        }
    }
}

/// Client for the email-marketing platform's list API
pub struct AudienceClient {
    client: Client,
    api_key: String,
    base_url: String,
    list_id: String,
}

impl AudienceClient {
    /// Build a client from configuration, or `None` when no API key is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &AudienceConfig) -> AppResult<Option<Self>> {
        let Some(api_key) = &config.api_key else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::config(format!("build audience HTTP client: {e}")))?;

        Ok(Some(Self {
            client,
            api_key: api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            list_id: config.list_id.clone(),
        }))
    }

    /// Upsert a contact into the list and tag it with its source.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the platform responds
    /// with a non-success status.
    pub async fn upsert_contact(&self, contact: &AudienceContact, tag: &str) -> AppResult<()> {
        let member_url = format!(
            "{}/lists/{}/members/{}",
            self.base_url,
            self.list_id,
            urlencoding::encode(&contact.email.to_lowercase())
        );

        let mut merge_fields = json!({
            "FNAME": contact.name,
        });
        if !contact.business_name.is_empty() {
            merge_fields["BNAME"] = Value::String(contact.business_name.clone());
        }
        if !contact.phone.is_empty() {
            merge_fields["PHONE"] = Value::String(contact.phone.clone());
        }
        if let Some(website) = &contact.website {
            merge_fields["WEBSITE"] = Value::String(website.clone());
        }
        if let Some(package) = &contact.package {
            merge_fields["PACKAGE"] = Value::String(package.clone());
        }

        let body = json!({
            "email_address": contact.email,
            "status_if_new": "subscribed",
            "merge_fields": merge_fields,
        });

        let response = self
            .client
            .put(&member_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service("audience", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "audience",
                format!("upsert returned {status}: {detail}"),
            ));
        }

        self.tag_contact(&member_url, tag).await
    }

    async fn tag_contact(&self, member_url: &str, tag: &str) -> AppResult<()> {
        let body = json!({
            "tags": [{ "name": tag, "status": "active" }],
        });

        let response = self
            .client
            .post(format!("{member_url}/tags"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service("audience", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::external_service(
                "audience",
                format!("tagging returned {status}"),
            ));
        }

        tracing::debug!(tag, "audience contact upserted and tagged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Package;

    #[test]
    fn test_contact_fields_are_sanitized() {
        let submission = NewSubmission {
            business_name: "Café Déjà-Vu!".into(),
            name: "José O'Brien".into(),
            email: "jose@cafe.test".into(),
            phone: "+1 (555) 010-0199".into(),
            business_description: "Coffee".into(),
            package: Package::Starter,
            package_other: None,
            has_existing_website: Some("yes".into()),
            existing_website_url: Some("ftp://cafe.test".into()),
        };

        let contact = AudienceContact::from_submission(&submission);
        assert_eq!(contact.name, "Jose O Brien");
        assert_eq!(contact.business_name, "Cafe Deja Vu");
        assert_eq!(contact.phone, "15550100199");
        // Non-http scheme is dropped entirely
        assert_eq!(contact.website, None);
        assert_eq!(contact.package.as_deref(), Some("Starter"));
    }

    #[test]
    fn test_http_website_is_kept() {
        let submission = NewSubmission {
            business_name: "Acme".into(),
            name: "Jo".into(),
            email: "jo@acme.test".into(),
            phone: "5550100".into(),
            business_description: "Widgets".into(),
            package: Package::Growth,
            package_other: None,
            has_existing_website: Some("yes".into()),
            existing_website_url: Some("https://acme.test".into()),
        };

        let contact = AudienceContact::from_submission(&submission);
        assert_eq!(contact.website.as_deref(), Some("https://acme.test"));
    }

    #[test]
    fn test_client_disabled_without_api_key() {
        let config = AudienceConfig::default();
        assert!(AudienceClient::from_config(&config).unwrap().is_none());
    }
}
