//! Repository for the `users` table.

use sqlx::PgPool;
use dashshare_core::roles::Role;
use dashshare_core::types::DbId;

use crate::models::user::{CreateUser, User, UserRow, UserSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, role, company_id, invited_by, is_active, \
                       created_at, updated_at";

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, sqlx::Error> {
    rows.into_iter().map(User::try_from).collect()
}

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, name, role, company_id, invited_by, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.email)
            .bind(&input.name)
            .bind(input.role.as_str())
            .bind(input.company_id)
            .bind(input.invited_by)
            .bind(input.is_active)
            .fetch_one(pool)
            .await?
            .try_into()
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// `{id, name, email}` for each existing id in `ids`.
    pub async fn summaries(pool: &PgPool, ids: &[DbId]) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email FROM users WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Users among `ids` that belong to `company_id` and hold `role`.
    pub async fn find_in_company(
        pool: &PgPool,
        ids: &[DbId],
        company_id: DbId,
        role: Role,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE id = ANY($1) AND company_id = $2 AND role = $3 \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(ids)
            .bind(company_id)
            .bind(role.as_str())
            .fetch_all(pool)
            .await?;
        into_users(rows)
    }

    /// Active USER accounts invited by `admin_id`.
    pub async fn list_active_invited(
        pool: &PgPool,
        admin_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE invited_by = $1 AND is_active = true AND role = 'USER' \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(admin_id)
            .fetch_all(pool)
            .await?;
        into_users(rows)
    }

    /// Active users whose name case-insensitively equals one of `names`.
    ///
    /// `names` must already be lowercased. Company matching is exact: with
    /// `company_id = None` only users without a company match.
    pub async fn find_active_by_names(
        pool: &PgPool,
        names: &[String],
        company_id: Option<DbId>,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE LOWER(name) = ANY($1) AND is_active = true \
               AND company_id IS NOT DISTINCT FROM $2::BIGINT \
             ORDER BY id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(names)
            .bind(company_id)
            .fetch_all(pool)
            .await?;
        into_users(rows)
    }
}
