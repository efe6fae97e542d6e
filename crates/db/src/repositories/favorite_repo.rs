//! Repository for the `user_favorites` table.
//!
//! `sort_order` is kept dense (`0..n` per user) by every method that removes
//! rows.

use indexmap::IndexSet;
use sqlx::{PgConnection, PgPool};
use dashshare_core::types::DbId;

use crate::models::favorite::{Favorite, FavoriteRow};

const COLUMNS: &str = "user_id, dashboard_id, sort_order, tags, added_at";

/// Renumber the favorites of every user in `$1` to `0..n`, keeping order.
const REPACK_SQL: &str = "UPDATE user_favorites f SET sort_order = r.pos \
     FROM ( \
        SELECT user_id, dashboard_id, \
               (ROW_NUMBER() OVER ( \
                   PARTITION BY user_id ORDER BY sort_order, added_at, dashboard_id) - 1 \
               )::INTEGER AS pos \
        FROM user_favorites WHERE user_id = ANY($1) \
     ) r \
     WHERE f.user_id = r.user_id AND f.dashboard_id = r.dashboard_id \
       AND f.sort_order <> r.pos";

async fn repack(conn: &mut PgConnection, user_ids: &[DbId]) -> Result<(), sqlx::Error> {
    sqlx::query(REPACK_SQL).bind(user_ids).execute(conn).await?;
    Ok(())
}

/// Provides operations on per-user favorite lists.
pub struct FavoriteRepo;

impl FavoriteRepo {
    /// All favorites of a user in list order.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Favorite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_favorites \
             WHERE user_id = $1 \
             ORDER BY sort_order, added_at, dashboard_id"
        );
        let rows = sqlx::query_as::<_, FavoriteRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    /// Append a dashboard to the end of a user's list.
    ///
    /// A repeated `(user_id, dashboard_id)` fails with the primary-key
    /// unique violation.
    pub async fn append(
        pool: &PgPool,
        user_id: DbId,
        dashboard_id: DbId,
    ) -> Result<Favorite, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_favorites (user_id, dashboard_id, sort_order) \
             VALUES ($1, $2, \
                (SELECT COUNT(*) FROM user_favorites WHERE user_id = $1)::INTEGER) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, FavoriteRow>(&query)
            .bind(user_id)
            .bind(dashboard_id)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Remove one favorite and renumber the rest. Returns `false` if the
    /// dashboard was not a favorite.
    pub async fn remove(pool: &PgPool, user_id: DbId, dashboard_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM user_favorites WHERE user_id = $1 AND dashboard_id = $2",
        )
        .bind(user_id)
        .bind(dashboard_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed > 0 {
            repack(&mut tx, &[user_id]).await?;
        }

        tx.commit().await?;
        Ok(removed > 0)
    }

    /// Assign `sort_order = position` for each id in `ordered`.
    ///
    /// The caller guarantees `ordered` is a permutation of the user's
    /// favorites.
    pub async fn set_order(pool: &PgPool, user_id: DbId, ordered: &[DbId]) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE user_favorites f SET sort_order = (o.pos - 1)::INTEGER \
             FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS o(dashboard_id, pos) \
             WHERE f.user_id = $1 AND f.dashboard_id = o.dashboard_id",
        )
        .bind(user_id)
        .bind(ordered)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the tag set of one favorite. Returns `None` if it does not exist.
    pub async fn set_tags(
        pool: &PgPool,
        user_id: DbId,
        dashboard_id: DbId,
        tags: &IndexSet<String>,
    ) -> Result<Option<Favorite>, sqlx::Error> {
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        let query = format!(
            "UPDATE user_favorites SET tags = $3 \
             WHERE user_id = $1 AND dashboard_id = $2 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, FavoriteRow>(&query)
            .bind(user_id)
            .bind(dashboard_id)
            .bind(&tags)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Favorite::from))
    }

    /// `(dashboard_id, favorite_count)` over the favorites of users in
    /// `company_id` (all users when `None`), in order of first favorite.
    pub async fn counts(
        pool: &PgPool,
        company_id: Option<DbId>,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, i64)>(
            "SELECT f.dashboard_id, COUNT(*)::BIGINT \
             FROM user_favorites f \
             JOIN users u ON u.id = f.user_id \
             WHERE ($1::BIGINT IS NULL OR u.company_id = $1) \
             GROUP BY f.dashboard_id \
             ORDER BY MIN(f.added_at), f.dashboard_id",
        )
        .bind(company_id)
        .fetch_all(pool)
        .await
    }

    /// Remove a dashboard from every user's list and renumber the affected
    /// lists. Returns the number of favorites removed.
    pub async fn remove_dashboard(pool: &PgPool, dashboard_id: DbId) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user_ids: Vec<DbId> = sqlx::query_scalar(
            "DELETE FROM user_favorites WHERE dashboard_id = $1 RETURNING user_id",
        )
        .bind(dashboard_id)
        .fetch_all(&mut *tx)
        .await?;

        if !user_ids.is_empty() {
            repack(&mut tx, &user_ids).await?;
        }

        tx.commit().await?;
        Ok(user_ids.len() as u64)
    }
}
