// ABOUTME: Public chat message intake route
// ABOUTME: Persists visitor messages, generating a session id when absent

//! Chat message intake.
//!
//! Visitors may post anonymously; when no session id is supplied the
//! server generates one and returns it so the client can thread the
//! conversation. Side effects only fire when the visitor left an email.

use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::NewChatMessage;
use crate::rate_limiting::client_ip;
use crate::sanitize::is_valid_email;
use crate::server::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Incoming chat message payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response for a stored chat message
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: i64,
    pub session_id: String,
}

impl ChatMessageRequest {
    /// Validate the payload into an insertable chat message. Generates a
    /// session id when the client did not supply one.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`AppError`] for an empty message or malformed email.
    pub fn validate(self) -> Result<NewChatMessage, AppError> {
        let message = self
            .message
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| AppError::missing_field("message"))?;

        let user_email = match self.user_email.filter(|e| !e.trim().is_empty()) {
            Some(email) => {
                let email = email.trim().to_owned();
                if !is_valid_email(&email) {
                    return Err(AppError::invalid_input("Invalid email address"));
                }
                Some(email)
            }
            None => None,
        };

        let session_id = self
            .session_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(NewChatMessage {
            session_id,
            user_name: self.user_name.filter(|n| !n.trim().is_empty()),
            user_email,
            message,
        })
    }
}

/// Chat routes implementation
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create the public chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat/messages", post(Self::create_message))
            .with_state(resources)
    }

    async fn create_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ChatMessageRequest>,
    ) -> Result<Response, AppError> {
        resources
            .rate_limiter
            .check_chat(&client_ip(&headers))?;

        let new_message = request.validate()?;

        let id = resources.database.create_chat_message(&new_message).await?;

        resources.side_effects.on_chat_message(&new_message);

        tracing::info!(id, session = %new_message.session_id, "chat message stored");

        Ok((
            StatusCode::CREATED,
            Json(ChatMessageResponse {
                id,
                session_id: new_message.session_id,
            }),
        )
            .into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_message_required_and_trimmed() {
        let request = ChatMessageRequest {
            session_id: None,
            user_name: None,
            user_email: None,
            message: Some("  hello  ".into()),
        };
        let message = request.validate().unwrap();
        assert_eq!(message.message, "hello");

        let request = ChatMessageRequest {
            session_id: None,
            user_name: None,
            user_email: None,
            message: Some("   ".into()),
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn test_session_id_generated_when_absent() {
        let request = ChatMessageRequest {
            session_id: None,
            user_name: None,
            user_email: None,
            message: Some("hello".into()),
        };
        let message = request.validate().unwrap();
        assert!(!message.session_id.is_empty());
        assert!(Uuid::parse_str(&message.session_id).is_ok());
    }

    #[test]
    fn test_supplied_session_id_preserved() {
        let request = ChatMessageRequest {
            session_id: Some("existing-session".into()),
            user_name: None,
            user_email: None,
            message: Some("hello".into()),
        };
        let message = request.validate().unwrap();
        assert_eq!(message.session_id, "existing-session");
    }

    #[test]
    fn test_bad_email_rejected_but_absent_ok() {
        let request = ChatMessageRequest {
            session_id: None,
            user_name: Some("Jo".into()),
            user_email: Some("not-an-email".into()),
            message: Some("hello".into()),
        };
        assert!(request.validate().is_err());

        let request = ChatMessageRequest {
            session_id: None,
            user_name: None,
            user_email: None,
            message: Some("hello".into()),
        };
        let message = request.validate().unwrap();
        assert!(message.user_email.is_none());
    }
}
