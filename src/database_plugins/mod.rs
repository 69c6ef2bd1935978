// ABOUTME: Database abstraction layer with SQLite and PostgreSQL backends
// ABOUTME: Plugin architecture exposing a single provider trait to the application

use crate::models::{
    AdminUser, ChatMessage, NewChatMessage, NewSubmission, Submission, SubmissionPatch,
    SubmissionStatus,
};
use anyhow::Result;
use async_trait::async_trait;

pub mod factory;
pub mod sqlite;

#[cfg(feature = "postgresql")]
pub mod postgres;

/// Core database abstraction trait
///
/// All database implementations must implement this trait to provide
/// a consistent interface for the application layer.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Create a new database connection
    async fn new(database_url: &str) -> Result<Self>
    where
        Self: Sized;

    /// Run database migrations to set up schema
    async fn migrate(&self) -> Result<()>;

    // ================================
    // Contact Form Submissions
    // ================================

    /// Persist a new contact form submission, returning the generated id
    async fn create_submission(&self, submission: &NewSubmission) -> Result<i64>;

    /// Get a submission by id
    async fn get_submission(&self, id: i64) -> Result<Option<Submission>>;

    /// List submissions newest-first, optionally filtered by status
    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>>;

    /// Apply a partial update to a submission, returning the updated row
    /// or `None` when the id does not exist
    async fn update_submission(
        &self,
        id: i64,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>>;

    /// Number of submissions, optionally restricted to one status
    async fn count_submissions(&self, status: Option<SubmissionStatus>) -> Result<i64>;

    /// Number of submissions still in the `new` status
    async fn count_new_submissions(&self) -> Result<i64>;

    // ================================
    // Chat Messages
    // ================================

    /// Persist a new chat message, returning the generated id
    async fn create_chat_message(&self, message: &NewChatMessage) -> Result<i64>;

    /// List chat messages newest-first across all sessions
    async fn list_chat_messages(&self, limit: i64, offset: i64) -> Result<Vec<ChatMessage>>;

    /// Get all messages for one session, oldest-first
    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>>;

    /// Total number of chat messages
    async fn count_chat_messages(&self) -> Result<i64>;

    /// Number of chat messages not yet responded to
    async fn count_unresponded_messages(&self) -> Result<i64>;

    // ================================
    // Admin Users
    // ================================

    /// Get an admin user by username
    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>>;

    /// Create an admin user if the username is not already taken.
    /// Returns `true` when a row was inserted.
    async fn create_admin_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<bool>;
}
