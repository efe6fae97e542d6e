//! JSON frames carried over the notification socket.
//!
//! Every frame is an object with a `type` tag. Server frames carry their
//! payload under `data`.

use dashshare_core::types::DbId;
use dashshare_db::models::notification::Notification;
use serde::{Deserialize, Serialize};

/// Frames sent by the server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent<'a> {
    NewNotification(&'a Notification),
    #[serde(rename_all = "camelCase")]
    NotificationRead { notification_id: DbId },
    UnreadCount { count: i64 },
    Error { message: String },
}

impl ServerEvent<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frames accepted from clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    MarkRead {
        #[serde(alias = "notificationId")]
        notification_id: DbId,
    },
    GetUnreadCount,
}
