//! Company (tenant) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dashshare_core::types::{DbId, Timestamp};

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub subdomain: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The company fields embedded in dashboard responses.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CompanySummary {
    pub id: DbId,
    pub name: String,
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
        }
    }
}

/// DTO for creating a company.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub subdomain: Option<String>,
}
