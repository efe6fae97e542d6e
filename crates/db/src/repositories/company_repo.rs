//! Repository for the `companies` table.

use sqlx::PgPool;
use dashshare_core::types::DbId;

use crate::models::company::{Company, CompanySummary, CreateCompany};

const COLUMNS: &str = "id, name, subdomain, is_active, created_at, updated_at";

/// Provides CRUD operations for companies.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a new company, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies (name, subdomain) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(&input.name)
            .bind(&input.subdomain)
            .fetch_one(pool)
            .await
    }

    /// Find a company by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// `{id, name}` for each existing id in `ids`.
    pub async fn summaries(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<CompanySummary>, sqlx::Error> {
        sqlx::query_as::<_, CompanySummary>(
            "SELECT id, name FROM companies WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
