//! Handlers for the `/dashboards` resource: CRUD and assignment.
//!
//! Every endpoint requires authentication; mutations additionally require
//! an admin via [`RequireAdmin`]. The service repeats its own role checks.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use dashshare_core::types::DbId;
use dashshare_db::models::dashboard::UpdateDashboard;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{Json, Path};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::services::{AssignByDepartmentRequest, CreateDashboardRequest};
use crate::state::AppState;

/// Body of the assign and unassign endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdsBody {
    pub user_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/dashboards
pub async fn create_dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateDashboardRequest>,
) -> AppResult<impl IntoResponse> {
    let dashboard = state.dashboards.create_dashboard(&admin.user, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Dashboard created successfully",
            dashboard,
        )),
    ))
}

/// GET /api/v1/dashboards
///
/// Dashboards visible to the caller's role.
pub async fn list_dashboards(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let dashboards = state.dashboards.list_dashboards(&auth.user).await?;
    Ok(Json(ApiResponse::ok(dashboards)))
}

/// GET /api/v1/dashboards/{id}
pub async fn get_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let dashboard = state.dashboards.get_dashboard(&auth.user, id).await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}

/// PUT /api/v1/dashboards/{id}
///
/// Only `title`, `embedUrl`, `description` and `tags` are applied; other
/// fields in the body are ignored.
pub async fn update_dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDashboard>,
) -> AppResult<impl IntoResponse> {
    let dashboard = state
        .dashboards
        .update_dashboard(&admin.user, id, input)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Dashboard updated successfully",
        dashboard,
    )))
}

/// DELETE /api/v1/dashboards/{id}
pub async fn delete_dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.dashboards.delete_dashboard(&admin.user, id).await?;
    Ok(Json(ApiResponse::with_message(
        "Dashboard deleted successfully",
        serde_json::Value::Null,
    )))
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// POST /api/v1/dashboards/{id}/assign
pub async fn assign_dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UserIdsBody>,
) -> AppResult<impl IntoResponse> {
    let result = state
        .dashboards
        .assign_dashboard(&admin.user, id, &body.user_ids)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Dashboard assigned successfully",
        result,
    )))
}

/// POST /api/v1/dashboards/{id}/unassign
pub async fn unassign_dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UserIdsBody>,
) -> AppResult<impl IntoResponse> {
    let dashboard = state
        .dashboards
        .unassign_dashboard(&admin.user, id, &body.user_ids)
        .await?;
    Ok(Json(ApiResponse::with_message(
        "Users unassigned successfully",
        dashboard,
    )))
}

/// GET /api/v1/dashboards/department/{department}
pub async fn dashboards_by_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> AppResult<impl IntoResponse> {
    let dashboards = state
        .dashboards
        .dashboards_by_department(&admin.user, &department)
        .await?;
    Ok(Json(ApiResponse::ok(dashboards)))
}

/// POST /api/v1/dashboards/assign-by-department
pub async fn assign_by_department(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<AssignByDepartmentRequest>,
) -> AppResult<impl IntoResponse> {
    let result = state
        .dashboards
        .assign_by_department(&admin.user, &input)
        .await?;

    let message = format!(
        "Assigned {} dashboard(s) to {} user(s)",
        result.dashboard_ids.len(),
        result.user_ids.len()
    );
    Ok(Json(ApiResponse::with_message(message, result)))
}
