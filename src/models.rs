// ABOUTME: Core domain models for submissions, chat messages, and admin users
// ABOUTME: Defines the three persisted entities plus their enumerated field types
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common data models for lead intake and triage.
//!
//! All three entities are independent: chat messages group by `session_id`
//! but there are no foreign keys between tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pricing tier a lead expressed interest in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Package {
    Starter,
    Growth,
    #[serde(rename = "Pro Max")]
    ProMax,
    Other,
}

impl Package {
    /// Wire/database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Growth => "Growth",
            Self::ProMax => "Pro Max",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Package {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Starter" => Ok(Self::Starter),
            "Growth" => Ok(Self::Growth),
            "Pro Max" => Ok(Self::ProMax),
            "Other" => Ok(Self::Other),
            other => Err(format!("unknown package: {other}")),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage status of a submission.
///
/// A flat enum with no enforced transition graph: any status may move to any
/// other status via admin PATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    New,
    Contacted,
    Scheduled,
    InProgress,
    Completed,
    Rejected,
}

impl SubmissionStatus {
    /// Wire/database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Scheduled => "scheduled",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "scheduled" => Ok(Self::Scheduled),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact-form lead captured from the public site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub business_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub business_description: String,
    pub package: Package,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_existing_website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_website_url: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<String>,
}

/// Validated submission fields ready for insertion
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub business_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub business_description: String,
    pub package: Package,
    pub package_other: Option<String>,
    pub has_existing_website: Option<String>,
    pub existing_website_url: Option<String>,
}

/// Fields an admin may change on a submission.
///
/// At least one field must be present; `update_submission` rejects an
/// all-`None` patch upstream with a 400.
#[derive(Debug, Clone, Default)]
pub struct SubmissionPatch {
    pub status: Option<SubmissionStatus>,
    pub notes: Option<String>,
    pub internal_notes: Option<String>,
}

impl SubmissionPatch {
    /// True when the patch carries no recognized field
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.notes.is_none() && self.internal_notes.is_none()
    }
}

/// A message from a (possibly anonymous) site visitor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    // Persisted for schema parity with the original data model; no API
    // surface sets these yet.
    pub responded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Validated chat message fields ready for insertion
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub session_id: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub message: String,
}

/// Operator credential; seeded at boot, never created through the API
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counts for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_submissions: i64,
    pub new_submissions: i64,
    pub total_messages: i64,
    pub unread_messages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_round_trip() {
        for pkg in [
            Package::Starter,
            Package::Growth,
            Package::ProMax,
            Package::Other,
        ] {
            assert_eq!(pkg.as_str().parse::<Package>().unwrap(), pkg);
        }
        assert!("Platinum".parse::<Package>().is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            SubmissionStatus::New,
            SubmissionStatus::Contacted,
            SubmissionStatus::Scheduled,
            SubmissionStatus::InProgress,
            SubmissionStatus::Completed,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(
                status.as_str().parse::<SubmissionStatus>().unwrap(),
                status
            );
        }
        assert!("archived".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_submission_serializes_camel_case() {
        let submission = Submission {
            id: 1,
            business_name: "Acme Widgets".into(),
            name: "Jo Smith".into(),
            email: "jo@acme.test".into(),
            phone: "555-0100".into(),
            business_description: "Widgets".into(),
            package: Package::Starter,
            package_other: None,
            has_existing_website: None,
            existing_website_url: None,
            status: SubmissionStatus::New,
            submitted_at: Utc::now(),
            notes: None,
            internal_notes: None,
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["businessName"], "Acme Widgets");
        assert_eq!(json["status"], "new");
        assert_eq!(json["package"], "Starter");
    }

    #[test]
    fn test_empty_patch_detected() {
        assert!(SubmissionPatch::default().is_empty());
        let patch = SubmissionPatch {
            notes: Some("called back".into()),
            ..SubmissionPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
