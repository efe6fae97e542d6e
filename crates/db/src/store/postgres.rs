//! [`Store`] backed by Postgres through the repository structs.

use std::collections::BTreeSet;

use async_trait::async_trait;
use indexmap::IndexSet;
use dashshare_core::roles::Role;
use dashshare_core::types::DbId;

use crate::models::comment::{Comment, CreateComment};
use crate::models::company::{Company, CompanySummary, CreateCompany};
use crate::models::dashboard::{CreateDashboard, Dashboard, DashboardFilter, UpdateDashboard};
use crate::models::favorite::Favorite;
use crate::models::notification::{NewNotification, Notification};
use crate::models::user::{CreateUser, User, UserSummary};
use crate::repositories::{
    CommentRepo, CompanyRepo, DashboardRepo, FavoriteRepo, NotificationRepo, UserRepo,
};
use crate::DbPool;

use super::Store;

/// Postgres-backed store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }

    async fn create_company(&self, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        CompanyRepo::create(&self.pool, input).await
    }

    async fn company_summaries(&self, ids: &[DbId]) -> Result<Vec<CompanySummary>, sqlx::Error> {
        CompanyRepo::summaries(&self.pool, ids).await
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, sqlx::Error> {
        UserRepo::create(&self.pool, input).await
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, sqlx::Error> {
        UserRepo::find_by_id(&self.pool, id).await
    }

    async fn user_summaries(&self, ids: &[DbId]) -> Result<Vec<UserSummary>, sqlx::Error> {
        UserRepo::summaries(&self.pool, ids).await
    }

    async fn find_company_users(
        &self,
        ids: &[DbId],
        company_id: DbId,
        role: Role,
    ) -> Result<Vec<User>, sqlx::Error> {
        UserRepo::find_in_company(&self.pool, ids, company_id, role).await
    }

    async fn list_invited_users(&self, admin_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        UserRepo::list_active_invited(&self.pool, admin_id).await
    }

    async fn find_active_users_by_names(
        &self,
        names: &[String],
        company_id: Option<DbId>,
    ) -> Result<Vec<User>, sqlx::Error> {
        UserRepo::find_active_by_names(&self.pool, names, company_id).await
    }

    async fn create_dashboard(&self, input: &CreateDashboard) -> Result<Dashboard, sqlx::Error> {
        DashboardRepo::create(&self.pool, input).await
    }

    async fn find_dashboard(&self, id: DbId) -> Result<Option<Dashboard>, sqlx::Error> {
        DashboardRepo::find_by_id(&self.pool, id).await
    }

    async fn list_dashboards(
        &self,
        filter: &DashboardFilter,
    ) -> Result<Vec<Dashboard>, sqlx::Error> {
        DashboardRepo::list(&self.pool, filter).await
    }

    async fn update_dashboard(
        &self,
        id: DbId,
        input: &UpdateDashboard,
    ) -> Result<Option<Dashboard>, sqlx::Error> {
        DashboardRepo::update(&self.pool, id, input).await
    }

    async fn delete_dashboard(&self, id: DbId) -> Result<bool, sqlx::Error> {
        DashboardRepo::delete(&self.pool, id).await
    }

    async fn add_access_users(
        &self,
        dashboard_ids: &[DbId],
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error> {
        DashboardRepo::add_access_users(&self.pool, dashboard_ids, user_ids).await
    }

    async fn remove_access_users(
        &self,
        dashboard_id: DbId,
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error> {
        DashboardRepo::remove_access_users(&self.pool, dashboard_id, user_ids).await
    }

    async fn list_favorites(&self, user_id: DbId) -> Result<Vec<Favorite>, sqlx::Error> {
        FavoriteRepo::list_for_user(&self.pool, user_id).await
    }

    async fn append_favorite(
        &self,
        user_id: DbId,
        dashboard_id: DbId,
    ) -> Result<Favorite, sqlx::Error> {
        FavoriteRepo::append(&self.pool, user_id, dashboard_id).await
    }

    async fn remove_favorite(&self, user_id: DbId, dashboard_id: DbId) -> Result<bool, sqlx::Error> {
        FavoriteRepo::remove(&self.pool, user_id, dashboard_id).await
    }

    async fn set_favorite_order(&self, user_id: DbId, ordered: &[DbId]) -> Result<(), sqlx::Error> {
        FavoriteRepo::set_order(&self.pool, user_id, ordered).await
    }

    async fn set_favorite_tags(
        &self,
        user_id: DbId,
        dashboard_id: DbId,
        tags: &IndexSet<String>,
    ) -> Result<Option<Favorite>, sqlx::Error> {
        FavoriteRepo::set_tags(&self.pool, user_id, dashboard_id, tags).await
    }

    async fn favorite_counts(
        &self,
        company_id: Option<DbId>,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        FavoriteRepo::counts(&self.pool, company_id).await
    }

    async fn remove_dashboard_from_favorites(&self, dashboard_id: DbId) -> Result<u64, sqlx::Error> {
        FavoriteRepo::remove_dashboard(&self.pool, dashboard_id).await
    }

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        CommentRepo::create(&self.pool, input).await
    }

    async fn find_comment(&self, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        CommentRepo::find_by_id(&self.pool, id).await
    }

    async fn list_comments(&self, dashboard_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        CommentRepo::list_for_dashboard(&self.pool, dashboard_id).await
    }

    async fn update_comment_message(
        &self,
        id: DbId,
        message: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        CommentRepo::update_message(&self.pool, id, message).await
    }

    async fn delete_comment_tree(&self, id: DbId) -> Result<u64, sqlx::Error> {
        CommentRepo::delete_tree(&self.pool, id).await
    }

    async fn delete_dashboard_comments(&self, dashboard_id: DbId) -> Result<u64, sqlx::Error> {
        CommentRepo::delete_for_dashboard(&self.pool, dashboard_id).await
    }

    async fn create_notification(
        &self,
        input: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        NotificationRepo::create(&self.pool, input).await
    }

    async fn list_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        NotificationRepo::list_for_recipient(&self.pool, recipient_id, unread_only, limit, offset)
            .await
    }

    async fn count_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
    ) -> Result<i64, sqlx::Error> {
        NotificationRepo::count_for_recipient(&self.pool, recipient_id, unread_only).await
    }

    async fn mark_notification_read(
        &self,
        id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        NotificationRepo::mark_read(&self.pool, id, recipient_id).await
    }

    async fn mark_all_notifications_read(&self, recipient_id: DbId) -> Result<u64, sqlx::Error> {
        NotificationRepo::mark_all_read(&self.pool, recipient_id).await
    }

    async fn delete_notification(&self, id: DbId, recipient_id: DbId) -> Result<bool, sqlx::Error> {
        NotificationRepo::delete(&self.pool, id, recipient_id).await
    }
}
