// ABOUTME: Best-effort side effects fired after a lead is persisted
// ABOUTME: Email notification and audience sync, dispatched off the request path

//! # Notifications
//!
//! Operator email, submitter auto-reply and audience sync. All of these
//! are dispatched as background tasks after the database write commits:
//! a slow or failing third party never blocks or fails the user-facing
//! request. Failures are logged and dropped, there is no retry.

pub mod audience;
pub mod email;

pub use audience::{AudienceClient, AudienceContact};
pub use email::EmailNotifier;

use crate::models::{NewChatMessage, NewSubmission};
use std::sync::Arc;

/// Tag applied to audience contacts that arrived via the contact form
pub const TAG_CONTACT_FORM: &str = "Contact Form";
/// Tag applied to audience contacts that arrived via the chat widget
pub const TAG_CHAT_MESSAGE: &str = "Chat Message";

/// Dispatches post-persist side effects without awaiting them
#[derive(Clone)]
pub struct SideEffects {
    email: Option<Arc<EmailNotifier>>,
    audience: Option<Arc<AudienceClient>>,
}

impl SideEffects {
    #[must_use]
    pub fn new(email: Option<EmailNotifier>, audience: Option<AudienceClient>) -> Self {
        Self {
            email: email.map(Arc::new),
            audience: audience.map(Arc::new),
        }
    }

    /// A no-op dispatcher for tests
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            email: None,
            audience: None,
        }
    }

    /// Fire notification email, auto-reply and audience sync for a new
    /// contact form submission. Returns immediately.
    pub fn on_submission(&self, submission: &NewSubmission) {
        if let Some(email) = &self.email {
            let email = Arc::clone(email);
            let submission = submission.clone();
            tokio::spawn(async move {
                if let Err(e) = email.send_submission_notification(&submission).await {
                    tracing::warn!("failed to send operator notification: {e}");
                }
                if let Err(e) = email.send_submission_auto_reply(&submission).await {
                    tracing::warn!("failed to send auto-reply: {e}");
                }
            });
        }

        if let Some(audience) = &self.audience {
            let audience = Arc::clone(audience);
            let contact = AudienceContact::from_submission(submission);
            tokio::spawn(async move {
                if let Err(e) = audience.upsert_contact(&contact, TAG_CONTACT_FORM).await {
                    tracing::warn!("audience sync failed for submission: {e}");
                }
            });
        }
    }

    /// Fire notification email and audience sync for a chat message.
    /// Skipped entirely when the visitor left no email address.
    pub fn on_chat_message(&self, message: &NewChatMessage) {
        let Some(user_email) = message.user_email.clone() else {
            return;
        };

        if let Some(email) = &self.email {
            let email = Arc::clone(email);
            let message = message.clone();
            tokio::spawn(async move {
                if let Err(e) = email.send_chat_notification(&message).await {
                    tracing::warn!("failed to send chat notification: {e}");
                }
            });
        }

        if let Some(audience) = &self.audience {
            let audience = Arc::clone(audience);
            let contact = AudienceContact {
                email: user_email,
                name: message
                    .user_name
                    .as_deref()
                    .map(crate::sanitize::sanitize_text)
                    .unwrap_or_default(),
                business_name: String::new(),
                phone: String::new(),
                website: None,
                package: None,
            };
            tokio::spawn(async move {
                if let Err(e) = audience.upsert_contact(&contact, TAG_CHAT_MESSAGE).await {
                    tracing::warn!("audience sync failed for chat message: {e}");
                }
            });
        }
    }
}
