// ABOUTME: Admin triage routes for submissions, chat overview, and stats
// ABOUTME: All handlers require a valid bearer token

//! Admin dashboard API.
//!
//! List, inspect and patch submissions; review chat activity; read
//! aggregate counts. Every handler authenticates the bearer token before
//! touching the database.

use crate::database_plugins::DatabaseProvider;
use crate::errors::AppError;
use crate::models::{ChatMessage, DashboardStats, Submission, SubmissionPatch, SubmissionStatus};
use crate::server::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 200;

/// Pagination and filter parameters for submission listing
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Patch payload for a submission
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub internal_notes: Option<String>,
}

/// Submission list response with paging info
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListResponse {
    pub submissions: Vec<Submission>,
    pub total: i64,
}

/// Chat message list response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListResponse {
    pub messages: Vec<ChatMessage>,
    pub total: i64,
}

/// Admin routes implementation
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/submissions", get(Self::list_submissions))
            .route(
                "/api/submissions/:id",
                get(Self::get_submission).patch(Self::patch_submission),
            )
            .route("/api/chat/messages", get(Self::list_chat_messages))
            .route("/api/chat/sessions/:session_id", get(Self::get_session))
            .route("/api/admin/stats", get(Self::stats))
            .with_state(resources)
    }

    fn authorize(resources: &ServerResources, headers: &HeaderMap) -> Result<(), AppError> {
        resources.auth_middleware.authenticate_request(headers)?;
        Ok(())
    }

    fn page(params: &ListParams) -> (i64, i64) {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = params.offset.unwrap_or(0).max(0);
        (limit, offset)
    }

    async fn list_submissions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<ListParams>,
    ) -> Result<Json<SubmissionListResponse>, AppError> {
        Self::authorize(&resources, &headers)?;

        let status = match &params.status {
            Some(raw) => Some(
                raw.parse::<SubmissionStatus>()
                    .map_err(|_| AppError::invalid_input(format!("Unknown status: {raw}")))?,
            ),
            None => None,
        };

        let (limit, offset) = Self::page(&params);
        let submissions = resources
            .database
            .list_submissions(status, limit, offset)
            .await?;
        let total = resources.database.count_submissions(status).await?;

        Ok(Json(SubmissionListResponse { submissions, total }))
    }

    async fn get_submission(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Json<Submission>, AppError> {
        Self::authorize(&resources, &headers)?;

        let submission = resources
            .database
            .get_submission(id)
            .await?
            .ok_or_else(|| AppError::not_found("Submission"))?;

        Ok(Json(submission))
    }

    async fn patch_submission(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(request): Json<PatchRequest>,
    ) -> Result<Json<Submission>, AppError> {
        Self::authorize(&resources, &headers)?;

        let status = match &request.status {
            Some(raw) => Some(
                raw.parse::<SubmissionStatus>()
                    .map_err(|_| AppError::invalid_input(format!("Unknown status: {raw}")))?,
            ),
            None => None,
        };

        let patch = SubmissionPatch {
            status,
            notes: request.notes,
            internal_notes: request.internal_notes,
        };

        if patch.is_empty() {
            return Err(AppError::invalid_input(
                "At least one of status, notes, internalNotes is required",
            ));
        }

        let updated = resources
            .database
            .update_submission(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("Submission"))?;

        tracing::info!(id, "submission updated");

        Ok(Json(updated))
    }

    async fn list_chat_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<ListParams>,
    ) -> Result<Json<ChatListResponse>, AppError> {
        Self::authorize(&resources, &headers)?;

        let (limit, offset) = Self::page(&params);
        let messages = resources.database.list_chat_messages(limit, offset).await?;
        let total = resources.database.count_chat_messages().await?;

        Ok(Json(ChatListResponse { messages, total }))
    }

    async fn get_session(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(session_id): Path<String>,
    ) -> Result<Json<Vec<ChatMessage>>, AppError> {
        Self::authorize(&resources, &headers)?;

        let messages = resources.database.get_session_messages(&session_id).await?;
        Ok(Json(messages))
    }

    async fn stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<DashboardStats>, AppError> {
        Self::authorize(&resources, &headers)?;

        let stats = DashboardStats {
            total_submissions: resources.database.count_submissions(None).await?,
            new_submissions: resources.database.count_new_submissions().await?,
            total_messages: resources.database.count_chat_messages().await?,
            unread_messages: resources.database.count_unresponded_messages().await?,
        };

        Ok(Json(stats))
    }
}
