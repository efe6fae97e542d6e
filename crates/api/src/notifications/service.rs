//! Notification creation for the four event kinds, plus the recipient-scoped
//! listing and read-state operations.
//!
//! Every send persists first and then pushes through the sink. A persistence
//! failure is returned to the caller; a push failure never is.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashshare_core::mentions::{extract_mentions, has_mentions};
use dashshare_core::notification_types::NotificationType;
use dashshare_core::types::DbId;
use dashshare_core::validation::{clamp_limit, clamp_page, page_count, page_offset};
use dashshare_db::models::comment::Comment;
use dashshare_db::models::dashboard::Dashboard;
use dashshare_db::models::notification::{NewNotification, Notification};
use dashshare_db::models::user::User;
use dashshare_db::Store;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::notifications::sink::{NoopSink, NotificationSink};

/// Query parameters for `GET /notifications`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// One page of a user's notifications.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
    pub unread_count: i64,
}

/// Creates, lists and updates notifications.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// A service that only persists.
    pub fn without_sink(store: Arc<dyn Store>) -> Self {
        Self::new(store, Arc::new(NoopSink))
    }

    /// Names mentioned in `text`; see [`extract_mentions`].
    pub fn extract_mentions(text: &str) -> Vec<String> {
        extract_mentions(text)
    }

    /// Persist one notification, then push it.
    async fn deliver(
        &self,
        kind: NotificationType,
        recipient_id: DbId,
        sender: &User,
        dashboard: &Dashboard,
        comment_id: Option<DbId>,
    ) -> AppResult<Notification> {
        let input = NewNotification {
            recipient_id,
            sender_id: sender.id,
            notification_type: kind,
            message: kind.render_message(sender.display_name(), &dashboard.title),
            dashboard_id: Some(dashboard.id),
            comment_id,
        };
        let notification = self.store.create_notification(&input).await?;
        self.sink.send_to_user(recipient_id, &notification).await;
        Ok(notification)
    }

    /// Notify the dashboard's creator and access list about a new comment.
    /// The author is never notified.
    pub async fn send_comment_notifications(
        &self,
        dashboard: &Dashboard,
        comment: &Comment,
        sender: &User,
    ) -> AppResult<Vec<Notification>> {
        let mut recipients: BTreeSet<DbId> = dashboard.access_users.clone();
        recipients.insert(dashboard.created_by);
        recipients.remove(&comment.user_id);

        let mut sent = Vec::with_capacity(recipients.len());
        for recipient_id in recipients {
            sent.push(
                self.deliver(
                    NotificationType::Comment,
                    recipient_id,
                    sender,
                    dashboard,
                    Some(comment.id),
                )
                .await?,
            );
        }

        tracing::debug!(
            dashboard_id = dashboard.id,
            comment_id = comment.id,
            count = sent.len(),
            "Comment notifications sent",
        );
        Ok(sent)
    }

    /// Notify every active user in the sender's company whose name matches
    /// an `@mention` in the comment (case-insensitively). Self-mentions are
    /// skipped. Text without mentions touches no storage at all.
    pub async fn send_mention_notifications(
        &self,
        dashboard: &Dashboard,
        comment: &Comment,
        sender: &User,
    ) -> AppResult<Vec<Notification>> {
        if !has_mentions(&comment.message) {
            return Ok(Vec::new());
        }

        let names: Vec<String> = extract_mentions(&comment.message)
            .into_iter()
            .map(|n| n.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mentioned = self
            .store
            .find_active_users_by_names(&names, sender.company_id)
            .await?;

        let mut sent = Vec::new();
        for user in mentioned.iter().filter(|u| u.id != sender.id) {
            sent.push(
                self.deliver(
                    NotificationType::Mention,
                    user.id,
                    sender,
                    dashboard,
                    Some(comment.id),
                )
                .await?,
            );
        }

        tracing::debug!(
            dashboard_id = dashboard.id,
            comment_id = comment.id,
            count = sent.len(),
            "Mention notifications sent",
        );
        Ok(sent)
    }

    /// One DASHBOARD_ASSIGNED notification per entry of `user_ids`,
    /// duplicates and already-assigned users included.
    pub async fn send_dashboard_assigned_notification(
        &self,
        dashboard: &Dashboard,
        user_ids: &[DbId],
        sender: &User,
    ) -> AppResult<Vec<Notification>> {
        let mut sent = Vec::with_capacity(user_ids.len());
        for recipient_id in user_ids {
            sent.push(
                self.deliver(
                    NotificationType::DashboardAssigned,
                    *recipient_id,
                    sender,
                    dashboard,
                    None,
                )
                .await?,
            );
        }
        Ok(sent)
    }

    /// Notify the active USER accounts the creating admin invited.
    pub async fn send_dashboard_created_notification(
        &self,
        dashboard: &Dashboard,
        admin: &User,
    ) -> AppResult<Vec<Notification>> {
        let invited = self.store.list_invited_users(admin.id).await?;
        if invited.is_empty() {
            return Ok(Vec::new());
        }

        let mut sent = Vec::with_capacity(invited.len());
        for user in &invited {
            sent.push(
                self.deliver(
                    NotificationType::DashboardCreated,
                    user.id,
                    admin,
                    dashboard,
                    None,
                )
                .await?,
            );
        }
        Ok(sent)
    }

    /// A page of the user's notifications, newest first, with the total for
    /// the active filter and the overall unread count.
    ///
    /// The three reads are independent and may observe different moments.
    pub async fn get_user_notifications(
        &self,
        user_id: DbId,
        query: &NotificationQuery,
    ) -> AppResult<NotificationPage> {
        let page = clamp_page(query.page);
        let limit = clamp_limit(query.limit);
        let offset = page_offset(page, limit);

        let notifications = self
            .store
            .list_notifications(user_id, query.unread_only, limit, offset)
            .await?;
        let total = self
            .store
            .count_notifications(user_id, query.unread_only)
            .await?;
        let unread_count = self.store.count_notifications(user_id, true).await?;

        Ok(NotificationPage {
            notifications,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: page_count(total, limit),
            },
            unread_count,
        })
    }

    pub async fn get_unread_count(&self, user_id: DbId) -> AppResult<i64> {
        Ok(self.store.count_notifications(user_id, true).await?)
    }

    /// Mark one of the user's notifications read. Someone else's
    /// notification is reported as not found.
    pub async fn mark_as_read(&self, id: DbId, user_id: DbId) -> AppResult<Notification> {
        self.store
            .mark_notification_read(id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification", id))
    }

    /// Returns the number of notifications flipped to read.
    pub async fn mark_all_as_read(&self, user_id: DbId) -> AppResult<u64> {
        let updated = self.store.mark_all_notifications_read(user_id).await?;
        tracing::debug!(user_id, updated, "Marked all notifications read");
        Ok(updated)
    }

    pub async fn delete_notification(&self, id: DbId, user_id: DbId) -> AppResult<()> {
        if self.store.delete_notification(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Notification", id))
        }
    }
}
