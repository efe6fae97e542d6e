//! Repository for the `dashboards` and `dashboard_access_users` tables.

use std::collections::BTreeSet;

use sqlx::PgPool;
use dashshare_core::types::DbId;

use crate::models::dashboard::{
    CreateDashboard, Dashboard, DashboardFilter, DashboardRow, UpdateDashboard,
};

/// Column list; the access list is aggregated per dashboard. Queries must
/// alias `dashboards` as `d`.
const COLUMNS: &str = "d.id, d.title, d.embed_url, d.description, d.department, d.tags, \
                       d.created_by, d.company_id, \
                       ARRAY(SELECT a.user_id FROM dashboard_access_users a \
                             WHERE a.dashboard_id = d.id ORDER BY a.user_id) AS access_users, \
                       d.created_at, d.updated_at";

fn into_dashboards(rows: Vec<DashboardRow>) -> Result<Vec<Dashboard>, sqlx::Error> {
    rows.into_iter().map(Dashboard::try_from).collect()
}

/// Provides CRUD and access-list operations for dashboards.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Insert a new dashboard, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDashboard) -> Result<Dashboard, sqlx::Error> {
        let tags: Vec<&str> = input.tags.iter().map(String::as_str).collect();
        let query = format!(
            "INSERT INTO dashboards AS d \
                (title, embed_url, description, department, tags, created_by, company_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DashboardRow>(&query)
            .bind(&input.title)
            .bind(&input.embed_url)
            .bind(&input.description)
            .bind(input.department.as_str())
            .bind(&tags)
            .bind(input.created_by)
            .bind(input.company_id)
            .fetch_one(pool)
            .await?
            .try_into()
    }

    /// Find a dashboard by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dashboard>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dashboards d WHERE d.id = $1");
        sqlx::query_as::<_, DashboardRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Dashboard::try_from)
            .transpose()
    }

    /// List dashboards matching every set field of `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &DashboardFilter,
    ) -> Result<Vec<Dashboard>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dashboards d \
             WHERE ($1::BIGINT IS NULL OR d.created_by = $1) \
               AND ($2::BIGINT IS NULL OR EXISTS ( \
                    SELECT 1 FROM dashboard_access_users a \
                    WHERE a.dashboard_id = d.id AND a.user_id = $2)) \
               AND ($3::BIGINT IS NULL OR d.company_id = $3) \
               AND ($4::TEXT IS NULL OR d.department = $4) \
               AND ($5::BIGINT[] IS NULL OR d.id = ANY($5)) \
             ORDER BY d.created_at DESC, d.id DESC"
        );
        let rows = sqlx::query_as::<_, DashboardRow>(&query)
            .bind(filter.created_by)
            .bind(filter.access_user)
            .bind(filter.company_id)
            .bind(filter.department.map(|d| d.as_str()))
            .bind(filter.ids.as_deref())
            .fetch_all(pool)
            .await?;
        into_dashboards(rows)
    }

    /// Update the mutable fields. Only non-`None` fields are applied;
    /// `description: Some(None)` clears the description.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDashboard,
    ) -> Result<Option<Dashboard>, sqlx::Error> {
        let tags: Option<Vec<&str>> = input
            .tags
            .as_ref()
            .map(|t| t.iter().map(String::as_str).collect());
        let query = format!(
            "UPDATE dashboards AS d SET \
                title = COALESCE($2, d.title), \
                embed_url = COALESCE($3, d.embed_url), \
                description = CASE WHEN $4 THEN $5 ELSE d.description END, \
                tags = COALESCE($6, d.tags), \
                updated_at = NOW() \
             WHERE d.id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DashboardRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.embed_url)
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(tags)
            .fetch_optional(pool)
            .await?
            .map(Dashboard::try_from)
            .transpose()
    }

    /// Delete a dashboard by ID. Returns `true` if a row was removed.
    ///
    /// Access rows, favorites and comments go with it through
    /// `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dashboards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add every user to every dashboard's access list. Existing pairs are
    /// kept; returns the number of new pairs.
    pub async fn add_access_users(
        pool: &PgPool,
        dashboard_ids: &[DbId],
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let user_ids: Vec<DbId> = user_ids.iter().copied().collect();
        let result = sqlx::query(
            "INSERT INTO dashboard_access_users (dashboard_id, user_id) \
             SELECT d.id, u.id \
             FROM UNNEST($1::BIGINT[]) AS d(id) \
             CROSS JOIN UNNEST($2::BIGINT[]) AS u(id) \
             ON CONFLICT (dashboard_id, user_id) DO NOTHING",
        )
        .bind(dashboard_ids)
        .bind(&user_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Remove users from a dashboard's access list. Absent ids are ignored.
    pub async fn remove_access_users(
        pool: &PgPool,
        dashboard_id: DbId,
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let user_ids: Vec<DbId> = user_ids.iter().copied().collect();
        let result = sqlx::query(
            "DELETE FROM dashboard_access_users \
             WHERE dashboard_id = $1 AND user_id = ANY($2)",
        )
        .bind(dashboard_id)
        .bind(&user_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
