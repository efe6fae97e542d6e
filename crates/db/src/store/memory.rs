//! In-process [`Store`] used by tests and local demos.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use indexmap::{IndexMap, IndexSet};
use tokio::sync::Mutex;
use dashshare_core::roles::Role;
use dashshare_core::types::{DbId, Timestamp};

use crate::models::comment::{Comment, CreateComment};
use crate::models::company::{Company, CompanySummary, CreateCompany};
use crate::models::dashboard::{
    CreateDashboard, Dashboard, DashboardFilter, DashboardRef, UpdateDashboard,
};
use crate::models::favorite::Favorite;
use crate::models::notification::{NewNotification, Notification};
use crate::models::user::{CreateUser, User, UserSummary};

use super::Store;

/// A notification as stored; sender and dashboard are resolved on read.
#[derive(Debug, Clone)]
struct StoredNotification {
    id: DbId,
    input: NewNotification,
    is_read: bool,
    read_at: Option<Timestamp>,
    created_at: Timestamp,
}

#[derive(Debug, Default)]
struct State {
    /// One id sequence shared by every entity.
    last_id: DbId,
    companies: BTreeMap<DbId, Company>,
    users: BTreeMap<DbId, User>,
    dashboards: BTreeMap<DbId, Dashboard>,
    /// Kept in insertion order, which is also `added_at` order.
    favorites: Vec<Favorite>,
    comments: BTreeMap<DbId, Comment>,
    notifications: BTreeMap<DbId, StoredNotification>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn repack_favorites(&mut self, user_id: DbId) {
        let mut mine: Vec<&mut Favorite> = self
            .favorites
            .iter_mut()
            .filter(|f| f.user_id == user_id)
            .collect();
        mine.sort_by_key(|f| (f.order, f.added_at, f.dashboard_id));
        for (pos, favorite) in mine.into_iter().enumerate() {
            favorite.order = pos as i32;
        }
    }

    fn resolve(&self, stored: &StoredNotification) -> Option<Notification> {
        let sender = self.users.get(&stored.input.sender_id)?;
        let dashboard = stored
            .input
            .dashboard_id
            .and_then(|id| self.dashboards.get(&id))
            .map(|d| DashboardRef {
                id: d.id,
                title: d.title.clone(),
            });
        Some(Notification {
            id: stored.id,
            recipient_id: stored.input.recipient_id,
            sender_id: stored.input.sender_id,
            notification_type: stored.input.notification_type,
            message: stored.input.message.clone(),
            dashboard_id: stored.input.dashboard_id,
            comment_id: stored.input.comment_id,
            is_read: stored.is_read,
            read_at: stored.read_at,
            created_at: stored.created_at,
            sender: UserSummary::from(sender),
            dashboard,
        })
    }

    fn recipient_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
    ) -> impl Iterator<Item = &StoredNotification> {
        // BTreeMap order is ascending id; reversed gives newest first.
        self.notifications
            .values()
            .rev()
            .filter(move |n| n.input.recipient_id == recipient_id && (!unread_only || !n.is_read))
    }
}

fn filter_matches(dashboard: &Dashboard, filter: &DashboardFilter) -> bool {
    filter.created_by.is_none_or(|id| dashboard.created_by == id)
        && filter
            .access_user
            .is_none_or(|id| dashboard.access_users.contains(&id))
        && filter
            .company_id
            .is_none_or(|id| dashboard.company_id == Some(id))
        && filter.department.is_none_or(|d| dashboard.department == d)
        && filter
            .ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&dashboard.id))
}

/// Process-local store. All state sits behind one async mutex, so every
/// call is atomic with respect to the others.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_notifications: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent notification write fail (or succeed again).
    pub fn set_fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }

    /// Number of stored notifications across all recipients.
    pub async fn notification_count(&self) -> usize {
        self.state.lock().await.notifications.len()
    }

    /// Number of stored comments across all dashboards.
    pub async fn comment_count(&self) -> usize {
        self.state.lock().await.comments.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn health_check(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    async fn create_company(&self, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let company = Company {
            id: state.next_id(),
            name: input.name.clone(),
            subdomain: input.subdomain.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn company_summaries(&self, ids: &[DbId]) -> Result<Vec<CompanySummary>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .companies
            .values()
            .filter(|c| ids.contains(&c.id))
            .map(CompanySummary::from)
            .collect())
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            email: input.email.clone(),
            name: input.name.clone(),
            role: input.role,
            company_id: input.company_id,
            invited_by: input.invited_by,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> Result<Option<User>, sqlx::Error> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn user_summaries(&self, ids: &[DbId]) -> Result<Vec<UserSummary>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .map(UserSummary::from)
            .collect())
    }

    async fn find_company_users(
        &self,
        ids: &[DbId],
        company_id: DbId,
        role: Role,
    ) -> Result<Vec<User>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|u| ids.contains(&u.id) && u.company_id == Some(company_id) && u.role == role)
            .cloned()
            .collect())
    }

    async fn list_invited_users(&self, admin_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.invited_by == Some(admin_id) && u.is_active && u.role == Role::User)
            .cloned()
            .collect())
    }

    async fn find_active_users_by_names(
        &self,
        names: &[String],
        company_id: Option<DbId>,
    ) -> Result<Vec<User>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.is_active)
            .filter(|u| u.company_id == company_id)
            .filter(|u| {
                u.name
                    .as_deref()
                    .is_some_and(|name| names.contains(&name.to_lowercase()))
            })
            .cloned()
            .collect())
    }

    async fn create_dashboard(&self, input: &CreateDashboard) -> Result<Dashboard, sqlx::Error> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let dashboard = Dashboard {
            id: state.next_id(),
            title: input.title.clone(),
            embed_url: input.embed_url.clone(),
            description: input.description.clone(),
            department: input.department,
            tags: input.tags.clone(),
            created_by: input.created_by,
            company_id: input.company_id,
            access_users: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        };
        state.dashboards.insert(dashboard.id, dashboard.clone());
        Ok(dashboard)
    }

    async fn find_dashboard(&self, id: DbId) -> Result<Option<Dashboard>, sqlx::Error> {
        Ok(self.state.lock().await.dashboards.get(&id).cloned())
    }

    async fn list_dashboards(
        &self,
        filter: &DashboardFilter,
    ) -> Result<Vec<Dashboard>, sqlx::Error> {
        let state = self.state.lock().await;
        // Ids grow with creation time, so descending id is newest first.
        Ok(state
            .dashboards
            .values()
            .rev()
            .filter(|d| filter_matches(d, filter))
            .cloned()
            .collect())
    }

    async fn update_dashboard(
        &self,
        id: DbId,
        input: &UpdateDashboard,
    ) -> Result<Option<Dashboard>, sqlx::Error> {
        let mut state = self.state.lock().await;
        let Some(dashboard) = state.dashboards.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            dashboard.title = title.clone();
        }
        if let Some(embed_url) = &input.embed_url {
            dashboard.embed_url = embed_url.clone();
        }
        if let Some(description) = &input.description {
            dashboard.description = description.clone();
        }
        if let Some(tags) = &input.tags {
            dashboard.tags = tags.clone();
        }
        dashboard.updated_at = Utc::now();
        Ok(Some(dashboard.clone()))
    }

    async fn delete_dashboard(&self, id: DbId) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().await;
        if state.dashboards.remove(&id).is_none() {
            return Ok(false);
        }
        state.favorites.retain(|f| f.dashboard_id != id);
        state.comments.retain(|_, c| c.dashboard_id != id);
        Ok(true)
    }

    async fn add_access_users(
        &self,
        dashboard_ids: &[DbId],
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().await;
        let mut added = 0;
        for id in dashboard_ids {
            if let Some(dashboard) = state.dashboards.get_mut(id) {
                for user_id in user_ids {
                    if dashboard.access_users.insert(*user_id) {
                        added += 1;
                    }
                }
            }
        }
        Ok(added)
    }

    async fn remove_access_users(
        &self,
        dashboard_id: DbId,
        user_ids: &BTreeSet<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().await;
        let Some(dashboard) = state.dashboards.get_mut(&dashboard_id) else {
            return Ok(0);
        };
        let before = dashboard.access_users.len();
        dashboard.access_users.retain(|id| !user_ids.contains(id));
        Ok((before - dashboard.access_users.len()) as u64)
    }

    async fn list_favorites(&self, user_id: DbId) -> Result<Vec<Favorite>, sqlx::Error> {
        let state = self.state.lock().await;
        let mut mine: Vec<Favorite> = state
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by_key(|f| (f.order, f.added_at, f.dashboard_id));
        Ok(mine)
    }

    async fn append_favorite(
        &self,
        user_id: DbId,
        dashboard_id: DbId,
    ) -> Result<Favorite, sqlx::Error> {
        let mut state = self.state.lock().await;
        let mut count = 0;
        for f in state.favorites.iter().filter(|f| f.user_id == user_id) {
            if f.dashboard_id == dashboard_id {
                return Err(sqlx::Error::Protocol(format!(
                    "favorite ({user_id}, {dashboard_id}) already exists"
                )));
            }
            count += 1;
        }
        let favorite = Favorite {
            user_id,
            dashboard_id,
            order: count,
            tags: IndexSet::new(),
            added_at: Utc::now(),
        };
        state.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn remove_favorite(&self, user_id: DbId, dashboard_id: DbId) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().await;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| !(f.user_id == user_id && f.dashboard_id == dashboard_id));
        let removed = state.favorites.len() < before;
        if removed {
            state.repack_favorites(user_id);
        }
        Ok(removed)
    }

    async fn set_favorite_order(&self, user_id: DbId, ordered: &[DbId]) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock().await;
        for favorite in state.favorites.iter_mut().filter(|f| f.user_id == user_id) {
            if let Some(pos) = ordered.iter().position(|id| *id == favorite.dashboard_id) {
                favorite.order = pos as i32;
            }
        }
        Ok(())
    }

    async fn set_favorite_tags(
        &self,
        user_id: DbId,
        dashboard_id: DbId,
        tags: &IndexSet<String>,
    ) -> Result<Option<Favorite>, sqlx::Error> {
        let mut state = self.state.lock().await;
        let favorite = state
            .favorites
            .iter_mut()
            .find(|f| f.user_id == user_id && f.dashboard_id == dashboard_id);
        Ok(favorite.map(|f| {
            f.tags = tags.clone();
            f.clone()
        }))
    }

    async fn favorite_counts(
        &self,
        company_id: Option<DbId>,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        let state = self.state.lock().await;
        let mut counts: IndexMap<DbId, i64> = IndexMap::new();
        for favorite in &state.favorites {
            let in_scope = company_id.is_none_or(|c| {
                state
                    .users
                    .get(&favorite.user_id)
                    .is_some_and(|u| u.company_id == Some(c))
            });
            if in_scope {
                *counts.entry(favorite.dashboard_id).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn remove_dashboard_from_favorites(&self, dashboard_id: DbId) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().await;
        let affected: BTreeSet<DbId> = state
            .favorites
            .iter()
            .filter(|f| f.dashboard_id == dashboard_id)
            .map(|f| f.user_id)
            .collect();
        state.favorites.retain(|f| f.dashboard_id != dashboard_id);
        for user_id in &affected {
            state.repack_favorites(*user_id);
        }
        Ok(affected.len() as u64)
    }

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let comment = Comment {
            id: state.next_id(),
            dashboard_id: input.dashboard_id,
            user_id: input.user_id,
            message: input.message.clone(),
            parent_id: input.parent_id,
            edited: false,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self.state.lock().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, dashboard_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .values()
            .rev()
            .filter(|c| c.dashboard_id == dashboard_id)
            .cloned()
            .collect())
    }

    async fn update_comment_message(
        &self,
        id: DbId,
        message: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let mut state = self.state.lock().await;
        Ok(state.comments.get_mut(&id).map(|c| {
            c.message = message.to_string();
            c.edited = true;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_comment_tree(&self, id: DbId) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().await;
        if !state.comments.contains_key(&id) {
            return Ok(0);
        }
        let mut doomed = BTreeSet::from([id]);
        let mut frontier = vec![id];
        while let Some(parent) = frontier.pop() {
            for child in state.comments.values().filter(|c| c.parent_id == Some(parent)) {
                if doomed.insert(child.id) {
                    frontier.push(child.id);
                }
            }
        }
        state.comments.retain(|comment_id, _| !doomed.contains(comment_id));
        Ok(doomed.len() as u64)
    }

    async fn delete_dashboard_comments(&self, dashboard_id: DbId) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().await;
        let before = state.comments.len();
        state.comments.retain(|_, c| c.dashboard_id != dashboard_id);
        Ok((before - state.comments.len()) as u64)
    }

    async fn create_notification(
        &self,
        input: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol(
                "notification writes are disabled".to_string(),
            ));
        }
        let mut state = self.state.lock().await;
        let stored = StoredNotification {
            id: state.next_id(),
            input: input.clone(),
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        let notification = state.resolve(&stored).ok_or(sqlx::Error::RowNotFound)?;
        state.notifications.insert(stored.id, stored);
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state
            .recipient_notifications(recipient_id, unread_only)
            .filter_map(|n| state.resolve(n))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_notifications(
        &self,
        recipient_id: DbId,
        unread_only: bool,
    ) -> Result<i64, sqlx::Error> {
        let state = self.state.lock().await;
        Ok(state.recipient_notifications(recipient_id, unread_only).count() as i64)
    }

    async fn mark_notification_read(
        &self,
        id: DbId,
        recipient_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let mut state = self.state.lock().await;
        let Some(stored) = state
            .notifications
            .get_mut(&id)
            .filter(|n| n.input.recipient_id == recipient_id)
        else {
            return Ok(None);
        };
        stored.is_read = true;
        if stored.read_at.is_none() {
            stored.read_at = Some(Utc::now());
        }
        let stored = stored.clone();
        Ok(state.resolve(&stored))
    }

    async fn mark_all_notifications_read(&self, recipient_id: DbId) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let mut updated = 0;
        for stored in state
            .notifications
            .values_mut()
            .filter(|n| n.input.recipient_id == recipient_id && !n.is_read)
        {
            stored.is_read = true;
            stored.read_at = Some(now);
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_notification(&self, id: DbId, recipient_id: DbId) -> Result<bool, sqlx::Error> {
        let mut state = self.state.lock().await;
        let owned = state
            .notifications
            .get(&id)
            .is_some_and(|n| n.input.recipient_id == recipient_id);
        if owned {
            state.notifications.remove(&id);
        }
        Ok(owned)
    }
}
