use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::Message;
use dashshare_core::types::{DbId, Timestamp};
use dashshare_db::models::notification::Notification;
use tokio::sync::{mpsc, RwLock};

use crate::notifications::NotificationSink;
use crate::ws::events::ServerEvent;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// The user the connection authenticated as during the handshake.
    pub user_id: DbId,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Live WebSocket connections, keyed by connection id.
///
/// A user may hold several connections (tabs, devices); pushes fan out to
/// all of them. Shared behind an `Arc`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection for `user_id`.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Send a message to one connection. `false` if it is gone.
    pub async fn send_to_connection(&self, conn_id: &str, message: Message) -> bool {
        self.connections
            .read()
            .await
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    /// Send a message to all connections belonging to a specific user.
    ///
    /// Returns the number of connections the message was sent to.
    pub async fn send_message_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values().filter(|c| c.user_id == user_id) {
            if conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of live connections held by one user.
    pub async fn user_connection_count(&self, user_id: DbId) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .count()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for WsManager {
    async fn send_to_user(&self, user_id: DbId, notification: &Notification) {
        let frame = match ServerEvent::NewNotification(notification).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(notification_id = notification.id, error = %e, "Failed to encode notification frame");
                return;
            }
        };

        let delivered = self.send_message_to_user(user_id, Message::Text(frame.into())).await;
        tracing::debug!(
            user_id,
            notification_id = notification.id,
            delivered,
            "Pushed notification",
        );
    }
}
