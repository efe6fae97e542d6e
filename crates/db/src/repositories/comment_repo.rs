//! Repository for the `comments` table.

use sqlx::PgPool;
use dashshare_core::types::DbId;

use crate::models::comment::{Comment, CreateComment};

const COLUMNS: &str = "id, dashboard_id, user_id, message, parent_id, edited, created_at, updated_at";

/// Provides CRUD operations for dashboard comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (dashboard_id, user_id, message, parent_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.dashboard_id)
            .bind(input.user_id)
            .bind(&input.message)
            .bind(input.parent_id)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every comment on a dashboard, newest first.
    pub async fn list_for_dashboard(
        pool: &PgPool,
        dashboard_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments \
             WHERE dashboard_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(dashboard_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the message and flag the comment as edited.
    pub async fn update_message(
        pool: &PgPool,
        id: DbId,
        message: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET message = $2, edited = true, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(message)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment and all of its descendants. Returns the number of
    /// rows removed.
    pub async fn delete_tree(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "WITH RECURSIVE tree AS ( \
                SELECT id FROM comments WHERE id = $1 \
                UNION ALL \
                SELECT c.id FROM comments c JOIN tree t ON c.parent_id = t.id \
             ) \
             DELETE FROM comments WHERE id IN (SELECT id FROM tree)",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete every comment on a dashboard.
    pub async fn delete_for_dashboard(pool: &PgPool, dashboard_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE dashboard_id = $1")
            .bind(dashboard_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
