pub mod dashboards;
pub mod health;
pub mod notifications;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws?token=<jwt>                                  WebSocket
///
/// /dashboards                                      create (admin), list
/// /dashboards/{id}                                 get, update, delete
/// /dashboards/{id}/assign | unassign               access list (admin)
/// /dashboards/assign-by-department                 bulk assign (admin)
/// /dashboards/department/{department}              list by department (admin)
/// /dashboards/{id}/favorite/...                    favorites
/// /dashboards/favorites/...                        own favorites
/// /dashboards/{id}/comments                        list, create
/// /dashboards/comments/{comment_id}                update, delete
///
/// /notifications                                   list, read state, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/dashboards", dashboards::router())
        .nest("/notifications", notifications::router())
}
