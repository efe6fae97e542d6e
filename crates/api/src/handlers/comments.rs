//! Handlers for dashboard comments.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use dashshare_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::services::CreateCommentRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateCommentBody {
    pub message: String,
}

/// GET /api/v1/dashboards/{id}/comments
pub async fn list_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(dashboard_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comments = state
        .dashboards
        .list_comments(&auth.user, dashboard_id)
        .await?;
    Ok(Json(ApiResponse::ok(comments)))
}

/// POST /api/v1/dashboards/{id}/comments
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(dashboard_id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .dashboards
        .create_comment(&auth.user, dashboard_id, &input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Comment created successfully", comment)),
    ))
}

/// PUT /api/v1/dashboards/comments/{comment_id}
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Json(body): Json<UpdateCommentBody>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .dashboards
        .update_comment(&auth.user, comment_id, &body.message)
        .await?;
    Ok(Json(ApiResponse::with_message("Comment updated successfully", comment)))
}

/// DELETE /api/v1/dashboards/comments/{comment_id}
///
/// Replies beneath the comment are deleted with it.
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state
        .dashboards
        .delete_comment(&auth.user, comment_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Comment deleted successfully",
        serde_json::Value::Null,
    )))
}
