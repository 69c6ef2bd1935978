// ABOUTME: PostgreSQL database implementation of the provider trait
// ABOUTME: Production backend with BIGSERIAL ids and TIMESTAMPTZ columns

//! PostgreSQL database implementation
//!
//! Same schema as the SQLite backend with `BIGSERIAL` ids and
//! `TIMESTAMPTZ` timestamps. Ids come back through `RETURNING id`.

use super::DatabaseProvider;
use crate::models::{
    AdminUser, ChatMessage, NewChatMessage, NewSubmission, Package, Submission, SubmissionPatch,
    SubmissionStatus,
};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

/// PostgreSQL database implementation
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    fn row_to_submission(row: &sqlx::postgres::PgRow) -> Result<Submission> {
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

    fn row_to_chat_message(row: &sqlx::postgres::PgRow) -> Result<ChatMessage> {
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

    fn row_to_admin(row: &sqlx::postgres::PgRow) -> Result<AdminUser> {
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
impl DatabaseProvider for PostgresDatabase {
    async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS submissions (
                id BIGSERIAL PRIMARY KEY,
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
                submitted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
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
                id BIGSERIAL PRIMARY KEY,
                session_id TEXT NOT NULL,
                user_name TEXT,
                user_email TEXT,
                message TEXT NOT NULL,
                sent_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                responded BOOLEAN NOT NULL DEFAULT FALSE,
                response TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS admin_users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                email TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
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
        let row = sqlx::query(
            r"
            INSERT INTO submissions (
                business_name, name, email, phone, business_description,
                package, package_other, has_existing_website, existing_website_url,
                status, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'new', NOW())
            RETURNING id
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
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
        let row = sqlx::query("SELECT * FROM submissions WHERE id = $1")
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
                SELECT * FROM submissions WHERE status = $1
                ORDER BY submitted_at DESC, id DESC LIMIT $2 OFFSET $3
                ",
            )
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT * FROM submissions ORDER BY submitted_at DESC, id DESC LIMIT $1 OFFSET $2",
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
            sqlx::query("UPDATE submissions SET status = $1 WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        if let Some(notes) = &patch.notes {
            sqlx::query("UPDATE submissions SET notes = $1 WHERE id = $2")
                .bind(notes)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        if let Some(internal_notes) = &patch.internal_notes {
            sqlx::query("UPDATE submissions SET internal_notes = $1 WHERE id = $2")
                .bind(internal_notes)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        self.get_submission(id).await
    }

    async fn count_submissions(&self, status: Option<SubmissionStatus>) -> Result<i64> {
        let row = if let Some(status) = status {
            sqlx::query("SELECT COUNT(*) as count FROM submissions WHERE status = $1")
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
        let row = sqlx::query(
            r"
            INSERT INTO chat_messages (session_id, user_name, user_email, message, sent_at, responded)
            VALUES ($1, $2, $3, $4, NOW(), FALSE)
            RETURNING id
            ",
        )
        .bind(&message.session_id)
        .bind(&message.user_name)
        .bind(&message.user_email)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn list_chat_messages(&self, limit: i64, offset: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages ORDER BY sent_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_chat_message).collect()
    }

    async fn get_session_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY sent_at ASC, id ASC",
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
        let row =
            sqlx::query("SELECT COUNT(*) as count FROM chat_messages WHERE responded = FALSE")
                .fetch_one(&self.pool)
                .await?;
        Ok(row.try_get("count")?)
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let row = sqlx::query("SELECT * FROM admin_users WHERE username = $1")
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
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (username) DO NOTHING
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
