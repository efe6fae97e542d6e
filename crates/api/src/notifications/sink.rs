//! Real-time delivery of freshly persisted notifications.

use async_trait::async_trait;
use dashshare_core::types::DbId;
use dashshare_db::models::notification::Notification;

/// Pushes a notification to every live connection of one user.
///
/// Delivery is best-effort: implementations log their own failures and
/// never report them to the caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_to_user(&self, user_id: DbId, notification: &Notification);
}

/// A sink that drops everything. Used when no real-time channel is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    async fn send_to_user(&self, _user_id: DbId, _notification: &Notification) {}
}
