use std::sync::Arc;

use dashshare_db::Store;

use crate::config::ServerConfig;
use crate::notifications::NotificationService;
use crate::services::DashboardService;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
    /// Live WebSocket connections; also the real-time notification sink.
    pub ws_manager: Arc<WsManager>,
    pub dashboards: DashboardService,
    pub notifications: NotificationService,
}

impl AppState {
    /// Wire the services over `store`, pushing notifications through
    /// `ws_manager`.
    pub fn new(store: Arc<dyn Store>, config: ServerConfig, ws_manager: Arc<WsManager>) -> Self {
        let notifications = NotificationService::new(Arc::clone(&store), ws_manager.clone());
        let dashboards = DashboardService::new(Arc::clone(&store), notifications.clone());

        Self {
            store,
            config: Arc::new(config),
            ws_manager,
            dashboards,
            notifications,
        }
    }
}
