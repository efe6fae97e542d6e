//! Handlers for the caller's favorite dashboards.

use axum::extract::State;
use axum::response::IntoResponse;
use dashshare_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{Json, Path, Query};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    pub dashboard_ids_order: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct TagsBody {
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub limit: Option<usize>,
}

/// POST /api/v1/dashboards/{id}/favorite/add
pub async fn add_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let favorite = state.dashboards.add_favorite(&auth.user, id).await?;
    Ok(Json(ApiResponse::with_message(
        "Dashboard added to favorites",
        favorite,
    )))
}

/// POST /api/v1/dashboards/{id}/favorite/remove
pub async fn remove_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.dashboards.remove_favorite(&auth.user, id).await?;
    Ok(Json(ApiResponse::with_message(
        "Dashboard removed from favorites",
        serde_json::Value::Null,
    )))
}

/// POST /api/v1/dashboards/{id}/favorite/toggle
pub async fn toggle_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.dashboards.toggle_favorite(&auth.user, id).await?;
    let message = if outcome.is_favorite {
        "Dashboard added to favorites"
    } else {
        "Dashboard removed from favorites"
    };
    Ok(Json(ApiResponse::with_message(message, outcome)))
}

/// GET /api/v1/dashboards/{id}/favorite/status
pub async fn favorite_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let status = state.dashboards.check_if_favorited(auth.user_id, id).await;
    Ok(Json(ApiResponse::ok(status)))
}

/// POST /api/v1/dashboards/{id}/favorite/tag
pub async fn tag_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<TagsBody>,
) -> AppResult<impl IntoResponse> {
    let favorite = state
        .dashboards
        .tag_favorite(&auth.user, id, &body.tags)
        .await?;
    Ok(Json(ApiResponse::with_message("Tags added", favorite)))
}

/// POST /api/v1/dashboards/{id}/favorite/untag
pub async fn untag_favorite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<TagsBody>,
) -> AppResult<impl IntoResponse> {
    let favorite = state
        .dashboards
        .untag_favorite(&auth.user, id, &body.tags)
        .await?;
    Ok(Json(ApiResponse::with_message("Tags removed", favorite)))
}

/// GET /api/v1/dashboards/favorites/mine
pub async fn list_favorites(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let favorites = state.dashboards.list_favorite_dashboards(&auth.user).await?;
    Ok(Json(ApiResponse::ok(favorites)))
}

/// PUT /api/v1/dashboards/favorites/reorder
///
/// Returns the resulting order of dashboard ids.
pub async fn reorder_favorites(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ReorderBody>,
) -> AppResult<impl IntoResponse> {
    let order = state
        .dashboards
        .reorder_favorites(&auth.user, &body.dashboard_ids_order)
        .await?;
    Ok(Json(ApiResponse::with_message("Favorites reordered", order)))
}

/// GET /api/v1/dashboards/with-favorites/status
pub async fn dashboards_with_favorite_status(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let dashboards = state
        .dashboards
        .dashboards_with_favorite_status(&auth.user)
        .await?;
    Ok(Json(ApiResponse::ok(dashboards)))
}

/// GET /api/v1/dashboards/analytics/most-favorited?limit=N
pub async fn most_favorited(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RankingQuery>,
) -> AppResult<impl IntoResponse> {
    let ranked = state
        .dashboards
        .most_favorited_dashboards(&admin.user, params.limit)
        .await?;
    Ok(Json(ApiResponse::ok(ranked)))
}
