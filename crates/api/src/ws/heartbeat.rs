use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every connected client every
/// [`HEARTBEAT_INTERVAL_SECS`] seconds. Abort the returned handle to stop it.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = ws_manager.connection_count().await;
            tracing::trace!(count, "WebSocket heartbeat ping");
            ws_manager.ping_all().await;
        }
    })
}
