//! Route definitions for the `/dashboards` resource, including favorites
//! and comments.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{comments, dashboards, favorites};
use crate::state::AppState;

/// Routes mounted at `/dashboards`.
///
/// ```text
/// POST   /                                  -> create_dashboard
/// GET    /                                  -> list_dashboards
/// POST   /assign-by-department              -> assign_by_department
/// GET    /department/{department}           -> dashboards_by_department
///
/// GET    /favorites/mine                    -> list_favorites
/// PUT    /favorites/reorder                 -> reorder_favorites
/// GET    /with-favorites/status             -> dashboards_with_favorite_status
/// GET    /analytics/most-favorited          -> most_favorited
///
/// PUT    /comments/{comment_id}             -> update_comment
/// DELETE /comments/{comment_id}             -> delete_comment
///
/// GET    /{id}                              -> get_dashboard
/// PUT    /{id}                              -> update_dashboard
/// DELETE /{id}                              -> delete_dashboard
/// POST   /{id}/assign                       -> assign_dashboard
/// POST   /{id}/unassign                     -> unassign_dashboard
///
/// GET    /{id}/favorite/status              -> favorite_status
/// POST   /{id}/favorite/toggle              -> toggle_favorite
/// POST   /{id}/favorite/add                 -> add_favorite
/// POST   /{id}/favorite/remove              -> remove_favorite
/// POST   /{id}/favorite/tag                 -> tag_favorite
/// POST   /{id}/favorite/untag               -> untag_favorite
///
/// GET    /{id}/comments                     -> list_comments
/// POST   /{id}/comments                     -> create_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(dashboards::create_dashboard).get(dashboards::list_dashboards),
        )
        .route(
            "/assign-by-department",
            post(dashboards::assign_by_department),
        )
        .route(
            "/department/{department}",
            get(dashboards::dashboards_by_department),
        )
        // Caller's favorites
        .route("/favorites/mine", get(favorites::list_favorites))
        .route("/favorites/reorder", put(favorites::reorder_favorites))
        .route(
            "/with-favorites/status",
            get(favorites::dashboards_with_favorite_status),
        )
        .route("/analytics/most-favorited", get(favorites::most_favorited))
        // Comments by id
        .route(
            "/comments/{comment_id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        // Single dashboard
        .route(
            "/{id}",
            get(dashboards::get_dashboard)
                .put(dashboards::update_dashboard)
                .delete(dashboards::delete_dashboard),
        )
        .route("/{id}/assign", post(dashboards::assign_dashboard))
        .route("/{id}/unassign", post(dashboards::unassign_dashboard))
        .route("/{id}/favorite/status", get(favorites::favorite_status))
        .route("/{id}/favorite/toggle", post(favorites::toggle_favorite))
        .route("/{id}/favorite/add", post(favorites::add_favorite))
        .route("/{id}/favorite/remove", post(favorites::remove_favorite))
        .route("/{id}/favorite/tag", post(favorites::tag_favorite))
        .route("/{id}/favorite/untag", post(favorites::untag_favorite))
        .route(
            "/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
}
