//! Dashboard entity model, DTOs and read views.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use dashshare_core::access::DashboardGrant;
use dashshare_core::departments::Department;
use dashshare_core::types::{DbId, Timestamp};

use super::company::CompanySummary;
use super::decode_text;
use super::user::UserSummary;

/// Raw `dashboards` row with its access list aggregated into an array.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct DashboardRow {
    pub id: DbId,
    pub title: String,
    pub embed_url: String,
    pub description: Option<String>,
    pub department: String,
    pub tags: Vec<String>,
    pub created_by: DbId,
    pub company_id: Option<DbId>,
    pub access_users: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An embedded BI dashboard and the users it is shared with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: DbId,
    pub title: String,
    pub embed_url: String,
    pub description: Option<String>,
    pub department: Department,
    pub tags: IndexSet<String>,
    pub created_by: DbId,
    pub company_id: Option<DbId>,
    pub access_users: BTreeSet<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<DashboardRow> for Dashboard {
    type Error = sqlx::Error;

    fn try_from(row: DashboardRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            embed_url: row.embed_url,
            description: row.description,
            department: decode_text("department", &row.department)?,
            tags: row.tags.into_iter().collect(),
            created_by: row.created_by,
            company_id: row.company_id,
            access_users: row.access_users.into_iter().collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Dashboard {
    /// Ownership and sharing state for access-control checks.
    pub fn grant(&self) -> DashboardGrant<'_> {
        DashboardGrant {
            created_by: self.created_by,
            company_id: self.company_id,
            access_users: &self.access_users,
        }
    }
}

/// DTO for inserting a dashboard. `created_by` and `company_id` come from
/// the creating admin, never from the request body.
#[derive(Debug, Clone)]
pub struct CreateDashboard {
    pub title: String,
    pub embed_url: String,
    pub description: Option<String>,
    pub department: Department,
    pub tags: IndexSet<String>,
    pub created_by: DbId,
    pub company_id: Option<DbId>,
}

/// Mutable dashboard fields. Anything else in an update body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDashboard {
    pub title: Option<String>,
    pub embed_url: Option<String>,
    /// Absent leaves the description alone; an explicit `null` clears it.
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    pub tags: Option<IndexSet<String>>,
}

/// Map a present field to `Some`, keeping `null` as `Some(None)`. Absent
/// fields fall back to `None` through `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Conjunctive filter for dashboard listings. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub created_by: Option<DbId>,
    pub access_user: Option<DbId>,
    pub company_id: Option<DbId>,
    pub department: Option<Department>,
    pub ids: Option<Vec<DbId>>,
}

/// The dashboard fields embedded in notification responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRef {
    pub id: DbId,
    pub title: String,
}

/// A dashboard with its creator, company and access list resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub id: DbId,
    pub title: String,
    pub embed_url: String,
    pub description: Option<String>,
    pub department: Department,
    pub tags: IndexSet<String>,
    pub created_by: Option<UserSummary>,
    pub company: Option<CompanySummary>,
    pub access_users: Vec<UserSummary>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl DashboardView {
    /// Build a view from a dashboard and already-loaded summaries.
    ///
    /// Access-list members missing from `users` are dropped.
    pub fn new(
        dashboard: &Dashboard,
        users: &[UserSummary],
        companies: &[CompanySummary],
    ) -> Self {
        let find_user = |id: DbId| users.iter().find(|u| u.id == id).cloned();
        Self {
            id: dashboard.id,
            title: dashboard.title.clone(),
            embed_url: dashboard.embed_url.clone(),
            description: dashboard.description.clone(),
            department: dashboard.department,
            tags: dashboard.tags.clone(),
            created_by: find_user(dashboard.created_by),
            company: dashboard
                .company_id
                .and_then(|id| companies.iter().find(|c| c.id == id).cloned()),
            access_users: dashboard
                .access_users
                .iter()
                .filter_map(|id| find_user(*id))
                .collect(),
            created_at: dashboard.created_at,
            updated_at: dashboard.updated_at,
            is_favorite: None,
        }
    }
}

/// Outcome of an explicit assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub dashboard: DashboardView,
    pub assigned_users: Vec<UserSummary>,
}

/// Outcome of a department-wide assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentAssignment {
    pub department: Department,
    pub dashboard_ids: Vec<DbId>,
    pub user_ids: BTreeSet<DbId>,
    pub notifications_sent: usize,
}
