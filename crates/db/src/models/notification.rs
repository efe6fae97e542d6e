//! Notification entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dashshare_core::notification_types::NotificationType;
use dashshare_core::types::{DbId, Timestamp};

use super::dashboard::DashboardRef;
use super::decode_text;
use super::user::UserSummary;

/// A `notifications` row joined with its sender and (if it still exists)
/// its dashboard.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct NotificationRow {
    pub id: DbId,
    pub recipient_id: DbId,
    pub sender_id: DbId,
    pub notification_type: String,
    pub message: String,
    pub dashboard_id: Option<DbId>,
    pub comment_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub sender_name: Option<String>,
    pub sender_email: String,
    pub dashboard_title: Option<String>,
}

/// A persisted notification with sender and dashboard resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: DbId,
    pub recipient_id: DbId,
    pub sender_id: DbId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub dashboard_id: Option<DbId>,
    pub comment_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub sender: UserSummary,
    /// `None` when the referenced dashboard has since been deleted.
    pub dashboard: Option<DashboardRef>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = sqlx::Error;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let dashboard = match (row.dashboard_id, row.dashboard_title) {
            (Some(id), Some(title)) => Some(DashboardRef { id, title }),
            _ => None,
        };
        Ok(Self {
            id: row.id,
            recipient_id: row.recipient_id,
            sender_id: row.sender_id,
            notification_type: decode_text("notification_type", &row.notification_type)?,
            message: row.message,
            dashboard_id: row.dashboard_id,
            comment_id: row.comment_id,
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
            sender: UserSummary {
                id: row.sender_id,
                name: row.sender_name,
                email: row.sender_email,
            },
            dashboard,
        })
    }
}

/// DTO for inserting a notification. Only the notification service builds these.
#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    pub recipient_id: DbId,
    pub sender_id: DbId,
    pub notification_type: NotificationType,
    pub message: String,
    pub dashboard_id: Option<DbId>,
    pub comment_id: Option<DbId>,
}
