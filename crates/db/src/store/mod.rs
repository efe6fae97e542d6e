//! The persistence seam consumed by the service layer.
//!
//! [`Store`] lists exactly the reads and writes the dashboard and
//! notification services need. [`PgStore`] forwards each call to the
//! matching repository; [`InMemoryStore`] keeps everything in process and
//! backs the service and HTTP tests.

mod memory;
mod postgres;

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

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Storage operations used by the services.
///
/// Every method reports failures as [`sqlx::Error`] so both backends share
/// one error path into the API's error mapping.
#[async_trait]
pub trait Store: Send + Sync {
    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), sqlx::Error>;

    // -- companies --

    async fn create_company(&self, input: &CreateCompany) -> Result<Company, sqlx::Error>;

    async fn company_summaries(&self, ids: &[DbId]) -> Result<Vec<CompanySummary>, sqlx::Error>;

    // -- users --

    async fn create_user(&self, input: &CreateUser) -> Result<User, sqlx::Error>;

    async fn find_user(&self, id: DbId) -> Result<Option<User>, sqlx::Error>;

    async fn user_summaries(&self, ids: &[DbId]) -> Result<Vec<UserSummary>, sqlx::Error>;

    /// Users among `ids` in `company_id` holding `role`.
    async fn find_company_users(
        &self,
        ids: &[DbId],
        company_id: DbId,
        role: Role,
    ) -> Result<Vec<User>, sqlx::Error>;

    /// Active USER accounts whose `invited_by` is `admin_id`.
    async fn list_invited_users(&self, admin_id: DbId) -> Result<Vec<User>, sqlx::Error>;

    /// Active users whose lowercased name is in `names` (already lowercased)
    /// and whose company is exactly `company_id`. `None` matches only users
    /// without a company.
    async fn find_active_users_by_names(
        &self,
        names: &[String],
        company_id: Option<DbId>,
    ) -> Result<Vec<User>, sqlx::Error>;

    // -- dashboards --

    async fn create_dashboard(&self, input: &CreateDashboard) -> Result<Dashboard, sqlx::Error>;

    async fn find_dashboard(&self, id: DbId) -> Result<Option<Dashboard>, sqlx::Error>;

    /// Dashboards matching `filter`, newest first.
    async fn list_dashboards(&self, filter: &DashboardFilter)
        -> Result<Vec<Dashboard>, sqlx::Error>;

    async fn update_dashboard(
        &self,
        id: DbId,
        input: &UpdateDashboard,
    ) -> Result<Option<Dashboard>, sqlx::Error>;

    /// Delete a dashboard together with its access list.
    async fn delete_dashboard(&self, id: DbId) -> Result<bool, sqlx::Error>;

    /// Add-to-set of every user onto every dashboard's access list.
    async fn add_access_users(
        &self,
        dashboard_ids: &[DbId],
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error>;

    async fn remove_access_users(
        &self,
        dashboard_id: DbId,
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error>;

    // -- favorites --

    /// A user's favorites in list order.
    async fn list_favorites(&self, user_id: DbId) -> Result<Vec<Favorite>, sqlx::Error>;

    /// Append to the end of the user's list.
    async fn append_favorite(&self, user_id: DbId, dashboard_id: DbId)
        -> Result<Favorite, sqlx::Error>;

    /// Remove and renumber the remainder densely. `false` if absent.
    async fn remove_favorite(&self, user_id: DbId, dashboard_id: DbId) -> Result<bool, sqlx::Error>;

    /// Apply a full ordering (a permutation of the user's favorites).
    async fn set_favorite_order(&self, user_id: DbId, ordered: &[DbId]) -> Result<(), sqlx::Error>;

    async fn set_favorite_tags(
        &self,
        user_id: DbId,
        dashboard_id: DbId,
        tags: &IndexSet<String>,
    ) -> Result<Option<Favorite>, sqlx::Error>;

    /// `(dashboard_id, count)` across users of `company_id` (everyone when
    /// `None`), in order of first favorite.
    async fn favorite_counts(&self, company_id: Option<DbId>)
        -> Result<Vec<(DbId, i64)>, sqlx::Error>;

    /// Drop a dashboard from every user's list, renumbering each.
    async fn remove_dashboard_from_favorites(&self, dashboard_id: DbId) -> Result<u64, sqlx::Error>;

    // -- comments --

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, sqlx::Error>;

    async fn find_comment(&self, id: DbId) -> Result<Option<Comment>, sqlx::Error>;

    /// Every comment on the dashboard, newest first.
    async fn list_comments(&self, dashboard_id: DbId) -> Result<Vec<Comment>, sqlx::Error>;

    /// Replace the message and set `edited`.
    async fn update_comment_message(
        &self,
        id: DbId,
        message: &str,
    ) -> Result<Option<Comment>, sqlx::Error>;

    /// Delete a comment and all descendants.
    async fn delete_comment_tree(&self, id: DbId) -> Result<u64, sqlx::Error>;

    async fn delete_dashboard_comments(&self, dashboard_id: DbId) -> Result<u64, sqlx::Error>;

    // -- notifications --

    async fn create_notification(&self, input: &NewNotification)
        -> Result<Notification, sqlx::Error>;

    /// One page of a recipient's notifications, newest first.
    async fn list_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error>;

    async fn count_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
    ) -> Result<i64, sqlx::Error>;

    /// Mark read, scoped to the recipient. `None` when not theirs or absent.
    async fn mark_notification_read(
        &self,
        id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error>;

    async fn mark_all_notifications_read(&self, recipient_id: DbId) -> Result<u64, sqlx::Error>;

    /// Delete, scoped to the recipient.
    async fn delete_notification(&self, id: DbId, recipient_id: DbId) -> Result<bool, sqlx::Error>;
}
