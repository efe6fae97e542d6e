//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and only ever touch
//! the caller's own notifications.

use axum::extract::State;
use axum::response::IntoResponse;
use dashshare_core::types::DbId;
use serde_json::json;

use crate::error::AppResult;
use crate::extract::{Json, Path, Query};
use crate::middleware::auth::AuthUser;
use crate::notifications::NotificationQuery;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/notifications?page=&limit=&unreadOnly=
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .notifications
        .get_user_notifications(auth.user_id, &params)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = state.notifications.get_unread_count(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(json!({ "count": count }))))
}

/// PUT /api/v1/notifications/{id}/read
///
/// 404 when the notification does not belong to the caller.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let notification = state.notifications.mark_as_read(id, auth.user_id).await?;
    Ok(Json(ApiResponse::with_message(
        "Notification marked as read",
        notification,
    )))
}

/// PUT /api/v1/notifications/mark-all-read
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let updated = state.notifications.mark_all_as_read(auth.user_id).await?;
    Ok(Json(ApiResponse::with_message(
        "All notifications marked as read",
        json!({ "updated": updated }),
    )))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state
        .notifications
        .delete_notification(id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Notification deleted",
        serde_json::Value::Null,
    )))
}
