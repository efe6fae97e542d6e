//! Repository for the `notifications` table.

use sqlx::PgPool;
use dashshare_core::types::DbId;

use crate::models::notification::{NewNotification, Notification, NotificationRow};

/// Select list joining the sender and, when it still exists, the dashboard.
const SELECT: &str = "SELECT n.id, n.recipient_id, n.sender_id, n.notification_type, n.message, \
                             n.dashboard_id, n.comment_id, n.is_read, n.read_at, n.created_at, \
                             s.name AS sender_name, s.email AS sender_email, \
                             d.title AS dashboard_title \
                      FROM notifications n \
                      JOIN users s ON s.id = n.sender_id \
                      LEFT JOIN dashboards d ON d.id = n.dashboard_id";

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Persist a notification and return it with references resolved.
    pub async fn create(pool: &PgPool, input: &NewNotification) -> Result<Notification, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO notifications \
                (recipient_id, sender_id, notification_type, message, dashboard_id, comment_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(input.recipient_id)
        .bind(input.sender_id)
        .bind(input.notification_type.as_str())
        .bind(&input.message)
        .bind(input.dashboard_id)
        .bind(input.comment_id)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a notification by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("{SELECT} WHERE n.id = $1");
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Notification::try_from)
            .transpose()
    }

    /// One page of a recipient's notifications, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_recipient(
        pool: &PgPool,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND n.is_read = false"
        } else {
            ""
        };
        let query = format!(
            "{SELECT} \
             WHERE n.recipient_id = $1 {filter} \
             ORDER BY n.created_at DESC, n.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(recipient_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    /// Count a recipient's notifications, optionally only the unread ones.
    pub async fn count_for_recipient(
        pool: &PgPool,
        recipient_id: DbId,
        unread_only: bool,
    ) -> Result<i64, sqlx::Error> {
        let filter = if unread_only { "AND is_read = false" } else { "" };
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM notifications WHERE recipient_id = $1 {filter}"
        );
        sqlx::query_scalar(&query)
            .bind(recipient_id)
            .fetch_one(pool)
            .await
    }

    /// Mark one of the recipient's notifications as read.
    ///
    /// Already-read notifications match too (their `read_at` is kept).
    /// Returns `None` if no such notification belongs to the recipient.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE notifications \
             SET is_read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND recipient_id = $2 \
             RETURNING id",
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(id) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    /// Mark all unread notifications for a recipient as read.
    ///
    /// Returns the number of notifications that were updated.
    pub async fn mark_all_read(pool: &PgPool, recipient_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one of the recipient's notifications. Returns `true` if deleted.
    pub async fn delete(pool: &PgPool, id: DbId, recipient_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
