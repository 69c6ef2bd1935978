// ABOUTME: SQLite database implementation of the provider trait
// ABOUTME: Embedded file or in-memory storage for development and small deployments

//! SQLite database implementation
//!
//! Stores submissions, chat messages and admin users in an embedded
//! SQLite file. In-memory URLs are pinned to a single connection so the
//! schema survives across pool checkouts.

use super::DatabaseProvider;
use crate::models::{
    AdminUser, ChatMessage, NewChatMessage, NewSubmission, Package, Submission, SubmissionPatch,
    SubmissionStatus,
};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

/// SQLite database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Access the underlying pool (test helpers)
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_submission(row: &sqlx::sqlite::SqliteRow) -> Result<Submission> {
        Ok(Submission {
            id: row.try_get("id")?,
            business_name: row.try_get("business_name")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            business_description: row.try_get("business_description")?,
            package: row
                .try_get::<String, _>("package")?
                .parse()
                .unwrap_or(Package::Other),
            package_other: row.try_get("package_other")?,
            has_existing_website: row.try_get("has_existing_website")?,
            existing_website_url: row.try_get("existing_website_url")?,
            status: row
                .try_get::<String, _>("status")?
                .parse()
                .unwrap_or(SubmissionStatus::New),
            submitted_at: row.try_get("submitted_at")?,
            notes: row.try_get("notes")?,
            internal_notes: row.try_get("internal_notes")?,
        })
    }

    fn row_to_chat_message(row: &sqlx::sqlite::SqliteRow) -> Result<ChatMessage> {
        Ok(ChatMessage {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
            message: row.try_get("message")?,
            sent_at: row.try_get("sent_at")?,
            responded: row.try_get("responded")?,
            response: row.try_get("response")?,
        })
    }

    fn row_to_admin(row: &sqlx::sqlite::SqliteRow) -> Result<AdminUser> {
        Ok(AdminUser {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> Result<Self> {
        let is_memory = database_url.contains(":memory:");

        // File databases are created on first connect; memory databases
        // must stay on one connection or every checkout sees an empty db.
        let pool = if is_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(database_url)
                .await?
        } else {
            let url = if database_url.contains('?') {
                database_url.to_owned()
            } else {
                format!("{database_url}?mode=rwc")
            };
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await?
        };

        Ok(Self { pool })
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                business_name TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                business_description TEXT NOT NULL,
                package TEXT NOT NULL,
                package_other TEXT,
                has_existing_website TEXT,
                existing_website_url TEXT,
                status TEXT NOT NULL DEFAULT 'new',
                submitted_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                notes TEXT,
                internal_notes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                user_name TEXT,
                user_email TEXT,
                message TEXT NOT NULL,
                sent_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                responded INTEGER NOT NULL DEFAULT 0,
                response TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS admin_users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                email TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_submissions_status ON submissions(status)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_submissions_submitted_at ON submissions(submitted_at)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_sent_at ON chat_messages(sent_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_submission(&self, submission: &NewSubmission) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO submissions (
                business_name, name, email, phone, business_description,
                package, package_other, has_existing_website, existing_website_url,
                status, submitted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'new', ?)
            ",
        )
        .bind(&submission.business_name)
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.business_description)
        .bind(submission.package.as_str())
        .bind(&submission.package_other)
        .bind(&submission.has_existing_website)
        .bind(&submission.existing_website_url)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
        let row = sqlx::query("SELECT * FROM submissions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_submission).transpose()
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>> {
        let rows = if let Some(status) = status {
            sqlx::query(
                r"
                SELECT * FROM submissions WHERE status = ?
                ORDER BY submitted_at DESC, id DESC LIMIT ? OFFSET ?
                ",
            )
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT * FROM submissions ORDER BY submitted_at DESC, id DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        rows.iter().map(Self::row_to_submission).collect()
    }

    async fn update_submission(
        &self,
        id: i64,
        patch: &SubmissionPatch,
    ) -> Result<Option<Submission>> {
        if let Some(status) = patch.status {
            sqlx::query("UPDATE submissions SET status = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        if let Some(notes) = &patch.notes {
            sqlx::query("UPDATE submissions SET notes = ? WHERE id = ?")
                .bind(notes)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        if let Some(internal_notes) = &patch.internal_notes {
            sqlx::query("UPDATE submissions SET internal_notes = ? WHERE id = ?")
                .bind(internal_notes)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        self.get_submission(id).await
    }

    async fn count_submissions(&self, status: Option<SubmissionStatus>) -> Result<i64> {
        let row = if let Some(status) = status {
            sqlx::query("SELECT COUNT(*) as count FROM submissions WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query("SELECT COUNT(*) as count FROM submissions")
                .fetch_one(&self.pool)
                .await?
        };
        Ok(row.try_get("count")?)
    }

    async fn count_new_submissions(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM submissions WHERE status = 'new'")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn create_chat_message(&self, message: &NewChatMessage) -> Result<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO chat_messages (session_id, user_name, user_email, message, sent_at, responded)
            VALUES (?, ?, ?, ?, ?, 0)
            ",
        )
        .bind(&message.session_id)
        .bind(&message.user_name)
        .bind(&message.user_email)
        .bind(&message.message)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_chat_messages(&self, limit: i64, offset: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages ORDER BY sent_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_chat_message).collect()
    }

    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY sent_at ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_chat_message).collect()
    }

    async fn count_chat_messages(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM chat_messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn count_unresponded_messages(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM chat_messages WHERE responded = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let row = sqlx::query("SELECT * FROM admin_users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_admin).transpose()
    }

    async fn create_admin_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO admin_users (username, password_hash, email, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (username) DO NOTHING
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
