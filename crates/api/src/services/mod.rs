//! Dashboard sharing rules.
//!
//! [`DashboardService`] is split across files by concern: dashboard CRUD and
//! assignment in [`dashboards`], favorites in [`favorites`], comments in
//! [`comments`]. Every operation takes the acting [`User`] and re-checks
//! role and access itself, independent of the route-level extractors.

pub mod comments;
pub mod dashboards;
pub mod favorites;

use std::collections::BTreeSet;
use std::sync::Arc;

use dashshare_core::access::can_access_dashboard;
use dashshare_core::types::DbId;
use dashshare_db::models::dashboard::{Dashboard, DashboardView};
use dashshare_db::models::user::User;
use dashshare_db::Store;

use crate::error::{AppError, AppResult};
use crate::notifications::NotificationService;

pub use comments::CreateCommentRequest;
pub use dashboards::{AssignByDepartmentRequest, CreateDashboardRequest};

/// Orchestrates dashboards, their access lists, favorites and comments.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
    notifications: NotificationService,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Load a dashboard or fail with 404.
    async fn load_dashboard(&self, id: DbId) -> AppResult<Dashboard> {
        self.store
            .find_dashboard(id)
            .await?
            .ok_or_else(|| AppError::not_found("Dashboard", id))
    }

    /// Load a dashboard the actor may view: 404 if absent, 403 if denied.
    async fn load_accessible(
        &self,
        id: DbId,
        actor: &User,
        denied: &'static str,
    ) -> AppResult<Dashboard> {
        let dashboard = self.load_dashboard(id).await?;
        if !can_access_dashboard(Some(dashboard.grant()), Some(actor.principal())) {
            return Err(AppError::forbidden(denied));
        }
        Ok(dashboard)
    }

    /// The company an admin-scoped operation runs in.
    fn company_of(actor: &User) -> AppResult<DbId> {
        actor
            .company_id
            .ok_or_else(|| AppError::forbidden("You are not attached to a company"))
    }

    /// Resolve creators, companies and access lists for a batch of dashboards.
    async fn views(&self, dashboards: &[Dashboard]) -> AppResult<Vec<DashboardView>> {
        let user_ids: BTreeSet<DbId> = dashboards
            .iter()
            .flat_map(|d| std::iter::once(d.created_by).chain(d.access_users.iter().copied()))
            .collect();
        let company_ids: BTreeSet<DbId> = dashboards.iter().filter_map(|d| d.company_id).collect();

        let user_ids: Vec<DbId> = user_ids.into_iter().collect();
        let company_ids: Vec<DbId> = company_ids.into_iter().collect();
        let users = self.store.user_summaries(&user_ids).await?;
        let companies = self.store.company_summaries(&company_ids).await?;

        Ok(dashboards
            .iter()
            .map(|d| DashboardView::new(d, &users, &companies))
            .collect())
    }

    async fn view(&self, dashboard: &Dashboard) -> AppResult<DashboardView> {
        let mut views = self.views(std::slice::from_ref(dashboard)).await?;
        views
            .pop()
            .ok_or_else(|| AppError::InternalError("Dashboard view resolution failed".into()))
    }
}
