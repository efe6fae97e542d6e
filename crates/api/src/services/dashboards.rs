//! Dashboard CRUD, role-scoped listing and access-list assignment.

use std::collections::BTreeSet;

use dashshare_core::access::{can_assign_dashboard, can_modify_dashboard};
use dashshare_core::departments::parse_department;
use dashshare_core::error::CoreError;
use dashshare_core::favorites::normalize_tags;
use dashshare_core::roles::Role;
use dashshare_core::types::DbId;
use dashshare_core::validation::{validate_embed_url, validate_title};
use dashshare_db::models::dashboard::{
    AssignmentResult, CreateDashboard, DashboardFilter, DashboardView, DepartmentAssignment,
    UpdateDashboard,
};
use dashshare_db::models::user::{User, UserSummary};
use serde::Deserialize;

use super::DashboardService;
use crate::error::{AppError, AppResult};

/// Body of `POST /dashboards`. The department stays a string until the
/// service validates it, so a bad value is a 400 rather than a body
/// rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDashboardRequest {
    pub title: String,
    pub embed_url: String,
    pub description: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `POST /dashboards/assign-by-department`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignByDepartmentRequest {
    pub department: Option<String>,
    pub user_ids: Vec<DbId>,
    /// Restrict the assignment to these dashboards; empty means all.
    #[serde(default)]
    pub selected_dashboard_ids: Vec<DbId>,
}

impl DashboardService {
    /// Create a dashboard owned by `actor`, who must be an ADMIN.
    ///
    /// Invited users are told about it afterwards; that fan-out is
    /// best-effort and never fails the creation.
    pub async fn create_dashboard(
        &self,
        actor: &User,
        input: CreateDashboardRequest,
    ) -> AppResult<DashboardView> {
        if actor.role != Role::Admin {
            return Err(AppError::forbidden("Only admins can create dashboards"));
        }

        let department = parse_department(input.department.as_deref()).map_err(AppError::validation)?;
        validate_title(&input.title).map_err(AppError::validation)?;
        validate_embed_url(&input.embed_url).map_err(AppError::validation)?;

        let dashboard = self
            .store
            .create_dashboard(&CreateDashboard {
                title: input.title.trim().to_string(),
                embed_url: input.embed_url.trim().to_string(),
                description: input.description,
                department,
                tags: normalize_tags(&input.tags),
                created_by: actor.id,
                company_id: actor.company_id,
            })
            .await?;

        tracing::info!(
            dashboard_id = dashboard.id,
            user_id = actor.id,
            department = %department,
            "Dashboard created",
        );

        match self
            .notifications
            .send_dashboard_created_notification(&dashboard, actor)
            .await
        {
            Ok(sent) => {
                tracing::debug!(dashboard_id = dashboard.id, count = sent.len(), "Creation fan-out done");
            }
            Err(e) => {
                tracing::error!(
                    dashboard_id = dashboard.id,
                    error = %e,
                    "Failed to send dashboard creation notifications",
                );
            }
        }

        self.view(&dashboard).await
    }

    /// Dashboards visible to `actor`, newest first: everything for a
    /// SUPER_ADMIN, own dashboards for an ADMIN, assigned ones for a USER.
    pub async fn list_dashboards(&self, actor: &User) -> AppResult<Vec<DashboardView>> {
        let filter = match actor.role {
            Role::SuperAdmin => DashboardFilter::default(),
            Role::Admin => DashboardFilter {
                created_by: Some(actor.id),
                ..Default::default()
            },
            Role::User => DashboardFilter {
                access_user: Some(actor.id),
                ..Default::default()
            },
        };
        let dashboards = self.store.list_dashboards(&filter).await?;
        self.views(&dashboards).await
    }

    pub async fn get_dashboard(&self, actor: &User, id: DbId) -> AppResult<DashboardView> {
        let dashboard = self.load_accessible(id, actor, "Access denied").await?;
        self.view(&dashboard).await
    }

    /// Apply the mutable fields of `input`; only the creator or a
    /// SUPER_ADMIN may do so.
    pub async fn update_dashboard(
        &self,
        actor: &User,
        id: DbId,
        mut input: UpdateDashboard,
    ) -> AppResult<DashboardView> {
        let dashboard = self.load_dashboard(id).await?;
        if !can_modify_dashboard(dashboard.grant(), actor.principal()) {
            return Err(AppError::forbidden("Only the creator can update this dashboard"));
        }

        if let Some(title) = input.title.as_mut() {
            validate_title(title).map_err(AppError::validation)?;
            *title = title.trim().to_string();
        }
        if let Some(embed_url) = input.embed_url.as_mut() {
            validate_embed_url(embed_url).map_err(AppError::validation)?;
            *embed_url = embed_url.trim().to_string();
        }
        input.tags = input.tags.map(normalize_tags);

        let updated = self
            .store
            .update_dashboard(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("Dashboard", id))?;

        tracing::info!(dashboard_id = id, user_id = actor.id, "Dashboard updated");
        self.view(&updated).await
    }

    /// Delete a dashboard with all of its comments and favorites.
    pub async fn delete_dashboard(&self, actor: &User, id: DbId) -> AppResult<()> {
        let dashboard = self.load_dashboard(id).await?;
        if !can_modify_dashboard(dashboard.grant(), actor.principal()) {
            return Err(AppError::forbidden("Only the creator can delete this dashboard"));
        }

        let comments = self.store.delete_dashboard_comments(id).await?;
        let favorites = self.store.remove_dashboard_from_favorites(id).await?;
        if !self.store.delete_dashboard(id).await? {
            return Err(AppError::not_found("Dashboard", id));
        }

        tracing::info!(
            dashboard_id = id,
            user_id = actor.id,
            comments,
            favorites,
            "Dashboard deleted",
        );
        Ok(())
    }

    /// Grant `user_ids` access. Every id must be a USER of the dashboard's
    /// company or nothing is assigned. Each listed id is notified, even if
    /// it already had access.
    pub async fn assign_dashboard(
        &self,
        actor: &User,
        id: DbId,
        user_ids: &[DbId],
    ) -> AppResult<AssignmentResult> {
        let dashboard = self.load_dashboard(id).await?;
        if !can_assign_dashboard(dashboard.grant(), actor.principal()) {
            return Err(AppError::forbidden("Only the creator can assign this dashboard"));
        }
        if user_ids.is_empty() {
            return Err(AppError::validation("userIds must be a non-empty array"));
        }

        let wanted: BTreeSet<DbId> = user_ids.iter().copied().collect();
        let assignees = self.eligible_users(dashboard.company_id, &wanted).await?;

        self.store.add_access_users(&[id], &wanted).await?;
        let dashboard = self.load_dashboard(id).await?;

        let sent = self
            .notifications
            .send_dashboard_assigned_notification(&dashboard, user_ids, actor)
            .await?;

        tracing::info!(
            dashboard_id = id,
            user_id = actor.id,
            assigned = wanted.len(),
            notified = sent.len(),
            "Dashboard assigned",
        );

        Ok(AssignmentResult {
            dashboard: self.view(&dashboard).await?,
            assigned_users: assignees.iter().map(UserSummary::from).collect(),
        })
    }

    /// Revoke access for `user_ids`; ids without access are ignored.
    pub async fn unassign_dashboard(
        &self,
        actor: &User,
        id: DbId,
        user_ids: &[DbId],
    ) -> AppResult<DashboardView> {
        let dashboard = self.load_dashboard(id).await?;
        if !can_modify_dashboard(dashboard.grant(), actor.principal()) {
            return Err(AppError::forbidden("Only the creator can unassign this dashboard"));
        }

        let removing: BTreeSet<DbId> = user_ids.iter().copied().collect();
        let removed = self.store.remove_access_users(id, &removing).await?;
        tracing::info!(dashboard_id = id, user_id = actor.id, removed, "Dashboard unassigned");

        let dashboard = self.load_dashboard(id).await?;
        self.view(&dashboard).await
    }

    /// Dashboards of the admin's company in one department, newest first.
    pub async fn dashboards_by_department(
        &self,
        actor: &User,
        department: &str,
    ) -> AppResult<Vec<DashboardView>> {
        if actor.role != Role::Admin {
            return Err(AppError::forbidden("Only admins can view department dashboards"));
        }
        let department = parse_department(Some(department)).map_err(AppError::validation)?;
        let company_id = Self::company_of(actor)?;

        let dashboards = self
            .store
            .list_dashboards(&DashboardFilter {
                company_id: Some(company_id),
                department: Some(department),
                ..Default::default()
            })
            .await?;
        self.views(&dashboards).await
    }

    /// Assign users to every dashboard of a department (or the selected
    /// subset of it) in the admin's company.
    ///
    /// Notifications go out dashboard by dashboard before the single bulk
    /// add-to-set; the two steps are not atomic together.
    pub async fn assign_by_department(
        &self,
        actor: &User,
        input: &AssignByDepartmentRequest,
    ) -> AppResult<DepartmentAssignment> {
        if actor.role != Role::Admin {
            return Err(AppError::forbidden("Only admins can assign dashboards"));
        }
        let department = parse_department(input.department.as_deref()).map_err(AppError::validation)?;
        let company_id = Self::company_of(actor)?;
        if input.user_ids.is_empty() {
            return Err(AppError::validation("userIds must be a non-empty array"));
        }

        let dashboards = self
            .store
            .list_dashboards(&DashboardFilter {
                company_id: Some(company_id),
                department: Some(department),
                ids: (!input.selected_dashboard_ids.is_empty())
                    .then(|| input.selected_dashboard_ids.clone()),
                ..Default::default()
            })
            .await?;
        if dashboards.is_empty() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Dashboards to assign",
                id: company_id,
            }));
        }

        let user_ids: BTreeSet<DbId> = input.user_ids.iter().copied().collect();
        self.eligible_users(Some(company_id), &user_ids).await?;

        let mut notifications_sent = 0;
        for dashboard in &dashboards {
            notifications_sent += self
                .notifications
                .send_dashboard_assigned_notification(dashboard, &input.user_ids, actor)
                .await?
                .len();
        }

        let dashboard_ids: Vec<DbId> = dashboards.iter().map(|d| d.id).collect();
        let added = self.store.add_access_users(&dashboard_ids, &user_ids).await?;

        tracing::info!(
            user_id = actor.id,
            department = %department,
            dashboards = dashboard_ids.len(),
            added,
            "Dashboards assigned by department",
        );

        Ok(DepartmentAssignment {
            department,
            dashboard_ids,
            user_ids,
            notifications_sent,
        })
    }

    /// Load `wanted` as USERs of `company_id`, failing with 400 unless every
    /// id qualifies.
    async fn eligible_users(
        &self,
        company_id: Option<DbId>,
        wanted: &BTreeSet<DbId>,
    ) -> AppResult<Vec<User>> {
        let ids: Vec<DbId> = wanted.iter().copied().collect();
        let found = match company_id {
            Some(company_id) => {
                self.store
                    .find_company_users(&ids, company_id, Role::User)
                    .await?
            }
            None => Vec::new(),
        };
        if found.len() != wanted.len() {
            return Err(AppError::validation(
                "Some users are invalid or not in the same company",
            ));
        }
        Ok(found)
    }
}
